//! Mesh geometry representation.
//!
//! A mesh is an indexed triangle list that composite solids are built
//! from. It is decoupled from the renderer's primitive types so meshes can
//! be generated procedurally or loaded by an external collaborator.

use std::f32::consts::PI;

use lumen_math::{Aabb, Vec2, Vec3};

/// A mesh consisting of vertex positions, optional normals, optional UVs and
/// triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - one per vertex when present)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional - one per vertex when present)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        Self::new_with_uvs(positions, indices, normals, None)
    }

    /// Create a new mesh with UV coordinates.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
    ) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            normals,
            uvs,
            indices,
            bounds,
        }
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        for &p in positions {
            bounds.extend(p);
        }
        bounds
    }

    /// Normals usable for smoothing, if they cover every vertex.
    ///
    /// A normal array whose length does not match the vertex count is
    /// partial data and is ignored (flat shading).
    pub fn vertex_normals(&self) -> Option<&[Vec3]> {
        match &self.normals {
            Some(normals) if normals.len() == self.positions.len() => Some(normals),
            Some(normals) => {
                log::warn!(
                    "Ignoring {} normals for {} vertices, mesh will be flat shaded",
                    normals.len(),
                    self.positions.len()
                );
                None
            }
            None => None,
        }
    }

    /// UVs, if they cover every vertex.
    pub fn vertex_uvs(&self) -> Option<&[Vec2]> {
        self.uvs
            .as_deref()
            .filter(|uvs| uvs.len() == self.positions.len())
    }

    /// Iterate over triangles as vertex index triplets.
    ///
    /// Triangles referencing a vertex out of range are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let count = self.positions.len();
        self.indices.chunks_exact(3).filter_map(move |face| {
            let tri = [face[0] as usize, face[1] as usize, face[2] as usize];
            tri.iter().all(|&i| i < count).then_some(tri)
        })
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Two-triangle quad `(a, b, c)` + `(a, c, d)` with UVs spanning [0, 1].
    pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self::new_with_uvs(
            vec![a, b, c, d],
            vec![0, 1, 2, 0, 2, 3],
            None,
            Some(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]),
        )
    }

    /// Latitude/longitude sphere.
    ///
    /// `sides` longitudinal segments and `sides / 2` latitudinal bands; the
    /// bands touching the poles are triangle fans, the others are quads.
    /// With `smooth` every vertex carries the analytic sphere normal.
    pub fn uv_sphere(origin: Vec3, radius: f32, sides: usize, smooth: bool) -> Self {
        let sides = if sides < 4 {
            log::warn!("Sphere needs at least 4 sides, got {}", sides);
            4
        } else {
            sides
        };
        let bands = sides / 2;

        // Unit direction at longitude phi, latitude theta
        let dir = |phi: f32, theta: f32| {
            Vec3::new(theta.cos() * phi.cos(), theta.sin(), theta.cos() * phi.sin())
        };

        let mut builder = MeshBuilder::new(smooth);
        for s in 0..sides {
            let t0 = s as f32 / sides as f32;
            let t1 = (s + 1) as f32 / sides as f32;
            let phi0 = -2.0 * PI * t0;
            let phi1 = -2.0 * PI * t1;

            for h in 0..bands {
                let h0 = h as f32 / bands as f32;
                let h1 = (h + 1) as f32 / bands as f32;
                let theta0 = PI * (h0 - 0.5);
                let theta1 = PI * (h1 - 0.5);

                let n00 = dir(phi0, theta0);
                let n10 = dir(phi1, theta0);
                let n01 = dir(phi0, theta1);
                let n11 = dir(phi1, theta1);

                let v00 = (origin + n00 * radius, n00, Vec2::new(t0, 1.0 - h0));
                let v10 = (origin + n10 * radius, n10, Vec2::new(t1, 1.0 - h0));
                let v01 = (origin + n01 * radius, n01, Vec2::new(t0, 1.0 - h1));
                let v11 = (origin + n11 * radius, n11, Vec2::new(t1, 1.0 - h1));

                if h == 0 {
                    // Bottom cap
                    builder.triangle(v00, v11, v01);
                } else if h == bands - 1 {
                    // Top cap
                    builder.triangle(v00, v10, v11);
                } else {
                    builder.triangle(v00, v10, v11);
                    builder.triangle(v00, v11, v01);
                }
            }
        }
        builder.build()
    }

    /// Upright cone standing on `origin`, apex at `origin + height * Y`,
    /// closed by a base disc.
    pub fn cone(origin: Vec3, radius: f32, height: f32, sides: usize, smooth: bool) -> Self {
        let sides = sides.max(3);
        let apex = origin + Vec3::Y * height;

        // Side normal for a generatrix at angle phi
        let side_normal =
            |phi: f32| Vec3::new(height * phi.cos(), radius, height * phi.sin()).normalize_or_zero();

        let mut builder = MeshBuilder::new(smooth);
        for s in 0..sides {
            let t0 = s as f32 / sides as f32;
            let t1 = (s + 1) as f32 / sides as f32;
            let phi0 = 2.0 * PI * t0;
            let phi1 = 2.0 * PI * t1;

            let rim0 = Vec3::new(phi0.cos(), 0.0, phi0.sin());
            let rim1 = Vec3::new(phi1.cos(), 0.0, phi1.sin());
            let b0 = origin + rim0 * radius;
            let b1 = origin + rim1 * radius;

            let n0 = side_normal(phi0);
            let n1 = side_normal(phi1);
            let n_apex = (n0 + n1).normalize_or_zero();

            builder.triangle(
                (b0, n0, Vec2::new(t0, 1.0)),
                (apex, n_apex, Vec2::new(0.5 * (t0 + t1), 0.0)),
                (b1, n1, Vec2::new(t1, 1.0)),
            );

            let disc_uv = |rim: Vec3| Vec2::new(0.5 + 0.5 * rim.x, 0.5 + 0.5 * rim.z);
            builder.triangle(
                (origin, -Vec3::Y, Vec2::splat(0.5)),
                (b0, -Vec3::Y, disc_uv(rim0)),
                (b1, -Vec3::Y, disc_uv(rim1)),
            );
        }
        builder.build()
    }
}

/// Vertex as (position, normal, uv)
type BuilderVertex = (Vec3, Vec3, Vec2);

/// Accumulates unshared triangle vertices for the generators.
struct MeshBuilder {
    smooth: bool,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
}

impl MeshBuilder {
    fn new(smooth: bool) -> Self {
        Self {
            smooth,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
        }
    }

    fn triangle(&mut self, a: BuilderVertex, b: BuilderVertex, c: BuilderVertex) {
        for (p, n, uv) in [a, b, c] {
            self.positions.push(p);
            self.normals.push(n);
            self.uvs.push(uv);
        }
    }

    fn build(self) -> Mesh {
        let indices = (0..self.positions.len() as u32).collect();
        let normals = self.smooth.then_some(self.normals);
        Mesh::new_with_uvs(self.positions, indices, normals, Some(self.uvs))
    }
}
