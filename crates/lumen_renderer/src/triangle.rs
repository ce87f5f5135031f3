//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::{Intersection, Primitive, Ray, Shader};
use lumen_math::{Aabb, Mat4, Mat4Ext, Vec2, Vec3, PARALLEL_EPSILON, RAY_EPSILON};

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    a: Vec3,
    b: Vec3,
    c: Vec3,
    /// Cached edges `b - a` and `c - a`
    edge1: Vec3,
    edge2: Vec3,
    /// Per-vertex shading normals, all three or none
    normals: Option<[Vec3; 3]>,
    /// Per-vertex texture coordinates
    uvs: [Vec2; 3],
    shader: Arc<dyn Shader>,
}

impl Triangle {
    /// Create a flat-shaded triangle from three vertices.
    pub fn new(shader: Arc<dyn Shader>, a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            a,
            b,
            c,
            edge1: b - a,
            edge2: c - a,
            normals: None,
            uvs: [Vec2::ZERO, Vec2::X, Vec2::Y],
            shader,
        }
    }

    /// Set per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.uvs = uvs;
        self
    }

    /// Set per-vertex normals for smooth shading.
    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = Some(normals.map(|n| n.normalize_or_zero()));
        self
    }

    /// Set per-vertex normals from possibly incomplete data.
    ///
    /// Smoothing is only enabled when all three normals are present;
    /// anything else falls back to the flat face normal.
    pub fn with_optional_normals(self, normals: [Option<Vec3>; 3]) -> Self {
        match normals {
            [Some(na), Some(nb), Some(nc)] => self.with_normals([na, nb, nc]),
            [None, None, None] => self,
            _ => {
                log::warn!("Triangle has partial vertex normals, using flat shading");
                self
            }
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// True if shading normals are interpolated from vertex normals.
    pub fn is_smooth(&self) -> bool {
        self.normals.is_some()
    }

    /// Unit geometric normal, `edge1 x edge2`. Zero for degenerate triangles.
    pub fn face_normal(&self) -> Vec3 {
        self.edge1.cross(self.edge2).normalize_or_zero()
    }

    #[inline]
    fn weights(ray: &Ray) -> Vec3 {
        Vec3::new(1.0 - ray.u - ray.v, ray.u, ray.v)
    }
}

impl Primitive for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let h = ray.direction.cross(self.edge2);
        let det = self.edge1.dot(h);

        // Ray is parallel to triangle (or the triangle has no area)
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.a;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge1);
        let v = inv_det * ray.direction.dot(q);
        if !(0.0..=1.0).contains(&v) || u + v > 1.0 {
            return None;
        }

        let t = inv_det * self.edge2.dot(q);
        if t < RAY_EPSILON || t >= ray.t {
            return None;
        }

        Some(Intersection { t, u, v })
    }

    fn normal(&self, ray: &Ray) -> Vec3 {
        match self.normals {
            Some([na, nb, nc]) => {
                let w = Self::weights(ray);
                (w.x * na + w.y * nb + w.z * nc).normalize_or_zero()
            }
            None => self.face_normal(),
        }
    }

    fn texture_coords(&self, ray: &Ray) -> Vec2 {
        let w = Self::weights(ray);
        w.x * self.uvs[0] + w.y * self.uvs[1] + w.z * self.uvs[2]
    }

    fn bounding_box(&self) -> Aabb {
        let mut bbox = Aabb::from_points(self.a, self.b);
        bbox.extend(self.c);
        // Pad thin dimensions to avoid degenerate AABBs
        bbox.padded()
    }

    fn transform(&mut self, m: &Mat4) {
        self.a = m.apply_point(self.a);
        self.b = m.apply_point(self.b);
        self.c = m.apply_point(self.c);
        self.edge1 = self.b - self.a;
        self.edge2 = self.c - self.a;

        if let Some(normals) = self.normals.as_mut() {
            for n in normals.iter_mut() {
                *n = m.apply_vector(*n).normalize_or_zero();
            }
        }
    }

    fn shader(&self) -> &Arc<dyn Shader> {
        &self.shader
    }
}
