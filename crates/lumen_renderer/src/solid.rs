//! Composite solids: groups of primitives that move together.

use std::sync::Arc;

use crate::{Primitive, Shader, Triangle};
use lumen_core::Mesh;
use lumen_math::{Aabb, Mat4, Mat4Ext, Vec3};

/// Conjugate `m` so it acts about `pivot`: `T(pivot) * m * T(-pivot)`.
pub fn about_pivot(pivot: Vec3, m: &Mat4) -> Mat4 {
    Mat4::from_translation(pivot) * *m * Mat4::from_translation(-pivot)
}

/// A group of primitives with a pivot for rigid animation.
///
/// Solids are flattened into the scene when added; the scene keeps the
/// member handles so the group can still be moved as a whole.
pub struct Solid {
    primitives: Vec<Box<dyn Primitive>>,
    pivot: Vec3,
}

impl Solid {
    pub fn new(pivot: Vec3) -> Self {
        Self {
            primitives: Vec::new(),
            pivot,
        }
    }

    pub fn add(&mut self, primitive: impl Primitive + 'static) {
        self.primitives.push(Box::new(primitive));
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn set_pivot(&mut self, pivot: Vec3) {
        self.pivot = pivot;
    }

    pub fn primitives(&self) -> &[Box<dyn Primitive>] {
        &self.primitives
    }

    /// Transform every member about the pivot. The pivot moves with them.
    pub fn transform(&mut self, m: &Mat4) {
        let m = about_pivot(self.pivot, m);
        for prim in &mut self.primitives {
            prim.transform(&m);
        }
        self.pivot = m.apply_point(self.pivot);
    }

    pub fn bounding_box(&self) -> Aabb {
        self.primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounding_box()))
    }

    pub fn into_parts(self) -> (Vec<Box<dyn Primitive>>, Vec3) {
        (self.primitives, self.pivot)
    }

    /// One triangle per mesh face, all sharing `shader`.
    pub fn from_mesh(shader: Arc<dyn Shader>, mesh: &Mesh, pivot: Vec3) -> Self {
        let normals = mesh.vertex_normals();
        let uvs = mesh.vertex_uvs();
        let mut solid = Self::new(pivot);

        for [ia, ib, ic] in mesh.triangles() {
            let p = &mesh.positions;
            let mut tri = Triangle::new(shader.clone(), p[ia], p[ib], p[ic]);
            if let Some(n) = normals {
                tri = tri.with_normals([n[ia], n[ib], n[ic]]);
            }
            if let Some(uv) = uvs {
                tri = tri.with_uvs([uv[ia], uv[ib], uv[ic]]);
            }
            solid.add(tri);
        }

        log::debug!(
            "Solid from mesh: {} triangles, {} vertices",
            solid.len(),
            mesh.vertex_count()
        );
        solid
    }

    /// Latitude/longitude sphere, pivot at `origin`.
    pub fn sphere(shader: Arc<dyn Shader>, origin: Vec3, radius: f32, sides: usize, smooth: bool) -> Self {
        Self::from_mesh(shader, &Mesh::uv_sphere(origin, radius, sides, smooth), origin)
    }

    /// Cone standing on its base disc at `origin`, pivot at `origin`.
    pub fn cone(
        shader: Arc<dyn Shader>,
        origin: Vec3,
        radius: f32,
        height: f32,
        sides: usize,
        smooth: bool,
    ) -> Self {
        Self::from_mesh(shader, &Mesh::cone(origin, radius, height, sides, smooth), origin)
    }

    /// Quad `a b c d` as two triangles, pivot at its center.
    pub fn quad(shader: Arc<dyn Shader>, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        let center = (a + b + c + d) * 0.25;
        Self::from_mesh(shader, &Mesh::quad(a, b, c, d), center)
    }
}
