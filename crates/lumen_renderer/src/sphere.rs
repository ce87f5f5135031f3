//! Analytic sphere primitive.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::{Intersection, Primitive, Ray, Shader};
use lumen_math::{Aabb, Mat3, Mat4, Mat4Ext, Vec2, Vec3, RAY_EPSILON};

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    shader: Arc<dyn Shader>,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(shader: Arc<dyn Shader>, center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            shader,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;
        Vec2::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Primitive for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let oc = self.center - ray.origin;
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let accept = |t: f32| t >= RAY_EPSILON && t < ray.t;

        // Find the nearest root in the acceptable range
        let mut root = h - sqrtd;
        if !accept(root) {
            root = h + sqrtd;
            if !accept(root) {
                return None;
            }
        }

        let uv = Self::sphere_uv((ray.at(root) - self.center) / self.radius);
        Some(Intersection {
            t: root,
            u: uv.x,
            v: uv.y,
        })
    }

    fn normal(&self, ray: &Ray) -> Vec3 {
        (ray.hit_point() - self.center).normalize_or_zero()
    }

    fn texture_coords(&self, ray: &Ray) -> Vec2 {
        Vec2::new(ray.u, ray.v)
    }

    fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }

    /// Moves the center. Non-uniform scale is approximated by the average
    /// scale factor.
    fn transform(&mut self, m: &Mat4) {
        self.center = m.apply_point(self.center);
        let scale = Mat3::from_mat4(*m).determinant().abs().cbrt();
        self.radius *= scale;
    }

    fn shader(&self) -> &Arc<dyn Shader> {
        &self.shader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlatShader;
    use lumen_math::Transform;

    fn sphere(center: Vec3, radius: f32) -> Sphere {
        Sphere::new(Arc::new(FlatShader::new(Vec3::ONE)), center, radius)
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = sphere(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.t - 0.5).abs() < 0.001); // Should hit at t=0.5
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = sphere(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = sphere(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = sphere.intersect(&ray).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_normal_and_closer_only() {
        let sphere = sphere(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let mut ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let hit = sphere.intersect(&ray).unwrap();
        ray.record(hit, crate::PrimId::new(0));
        assert!((sphere.normal(&ray) - -Vec3::Z).length() < 1e-5);

        // Already have a hit at t=4, nothing closer on the sphere
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn test_sphere_transform() {
        let mut sphere = sphere(Vec3::ZERO, 1.0);
        let m = Transform::new().scale(2.0).translate(Vec3::new(0.0, 3.0, 0.0)).matrix();
        sphere.transform(&m);

        assert!((sphere.center() - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-5);
        assert!((sphere.radius() - 2.0).abs() < 1e-5);
        assert!(sphere.bounding_box().contains(Vec3::new(0.0, 4.9, 0.0)));
    }
}
