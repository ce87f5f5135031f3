//! Infinite plane primitive.

use std::sync::Arc;

use crate::{Intersection, Primitive, Ray, Shader};
use lumen_math::{Aabb, Mat4, Mat4Ext, Vec2, Vec3, PARALLEL_EPSILON, RAY_EPSILON};

/// An infinite plane through `origin` with unit normal `normal`.
///
/// Texture coordinates are the hit position measured along two in-plane
/// axes, so textures tile once per world unit.
pub struct Plane {
    origin: Vec3,
    normal: Vec3,
    shader: Arc<dyn Shader>,
}

impl Plane {
    pub fn new(shader: Arc<dyn Shader>, origin: Vec3, normal: Vec3) -> Self {
        let normal = if normal.length() < PARALLEL_EPSILON {
            log::warn!("Plane created with a zero normal, it will never be hit");
            Vec3::ZERO
        } else {
            normal.normalize()
        };
        Self {
            origin,
            normal,
            shader,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn plane_normal(&self) -> Vec3 {
        self.normal
    }

    fn basis(&self) -> (Vec3, Vec3) {
        let tangent = self.normal.any_orthonormal_vector();
        (tangent, self.normal.cross(tangent))
    }
}

impl Primitive for Plane {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.origin - ray.origin).dot(self.normal) / denom;
        if t < RAY_EPSILON || t >= ray.t {
            return None;
        }

        let local = ray.at(t) - self.origin;
        let (s, b) = self.basis();
        Some(Intersection {
            t,
            u: local.dot(s),
            v: local.dot(b),
        })
    }

    fn normal(&self, _ray: &Ray) -> Vec3 {
        self.normal
    }

    fn texture_coords(&self, ray: &Ray) -> Vec2 {
        Vec2::new(ray.u, ray.v)
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }

    fn transform(&mut self, m: &Mat4) {
        self.origin = m.apply_point(self.origin);
        self.normal = m.apply_vector(self.normal).normalize_or_zero();
    }

    fn shader(&self) -> &Arc<dyn Shader> {
        &self.shader
    }
}
