// Affine transform builder
//
// Fluent, immutable wrapper around a glam::Mat4. Every call returns a new
// Transform whose matrix is `op * accumulated`, so operations are applied
// to points in the order they are chained.

use glam::{Mat4, Vec3};

use crate::PARALLEL_EPSILON;

/// Extension trait for Mat4 to apply homogeneous transforms.
pub trait Mat4Ext {
    /// Transform a point (w=1), dividing by the resulting w.
    fn apply_point(&self, point: Vec3) -> Vec3;

    /// Transform a direction (w=0). Translation does not affect vectors and
    /// there is no perspective divide.
    fn apply_vector(&self, vector: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn apply_point(&self, point: Vec3) -> Vec3 {
        let p = *self * point.extend(1.0);
        p.truncate() / p.w
    }

    fn apply_vector(&self, vector: Vec3) -> Vec3 {
        (*self * vector.extend(0.0)).truncate()
    }
}

/// Affine transformation builder.
///
/// ```ignore
/// let m = Transform::new().scale(2.0).rotate(Vec3::Y, 30.0).matrix();
/// solid.transform(&m);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
}

/// Build a Mat4 from row-major rows.
fn from_rows(rows: [[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(&rows).transpose()
}

impl Transform {
    /// The identity transform.
    pub fn new() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    /// The accumulated transformation matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    fn then(self, op: Mat4) -> Self {
        Self {
            matrix: op * self.matrix,
        }
    }

    /// Uniform scaling by `s`.
    pub fn scale(self, s: f32) -> Self {
        self.scale_xyz(Vec3::splat(s))
    }

    /// Per-axis scaling.
    pub fn scale_xyz(self, s: Vec3) -> Self {
        self.then(Mat4::from_diagonal(s.extend(1.0)))
    }

    /// Mirror across the YZ plane (x -> -x).
    pub fn reflect_x(self) -> Self {
        self.scale_xyz(Vec3::new(-1.0, 1.0, 1.0))
    }

    /// Mirror across the XZ plane (y -> -y).
    pub fn reflect_y(self) -> Self {
        self.scale_xyz(Vec3::new(1.0, -1.0, 1.0))
    }

    /// Mirror across the XY plane (z -> -z).
    pub fn reflect_z(self) -> Self {
        self.scale_xyz(Vec3::new(1.0, 1.0, -1.0))
    }

    /// Point reflection through the origin.
    pub fn reflect_origin(self) -> Self {
        self.scale_xyz(Vec3::splat(-1.0))
    }

    /// Translation by `t`.
    pub fn translate(self, t: Vec3) -> Self {
        self.then(Mat4::from_translation(t))
    }

    /// Shear. `h_ab` moves coordinate `a` proportionally to coordinate `b`.
    pub fn shear(self, h_xy: f32, h_xz: f32, h_yx: f32, h_yz: f32, h_zx: f32, h_zy: f32) -> Self {
        self.then(from_rows([
            [1.0, h_xy, h_xz, 0.0],
            [h_yx, 1.0, h_yz, 0.0],
            [h_zx, h_zy, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Rotation by `degrees` around `axis` (Rodrigues' formula).
    ///
    /// The axis is normalized first; a zero axis leaves the transform
    /// unchanged.
    pub fn rotate(self, axis: Vec3, degrees: f32) -> Self {
        if axis.length() < PARALLEL_EPSILON {
            log::warn!("Ignoring rotation around a zero-length axis");
            return self;
        }
        let k = axis.normalize();

        let (s, c) = degrees.to_radians().sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (k.x, k.y, k.z);

        self.then(from_rows([
            [c + t * x * x, t * x * y - s * z, t * x * z + s * y, 0.0],
            [t * y * x + s * z, c + t * y * y, t * y * z - s * x, 0.0],
            [t * z * x - s * y, t * z * y + s * x, c + t * z * z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Apply `m` to the point `p` in homogeneous coordinates.
    pub fn point(p: Vec3, m: &Mat4) -> Vec3 {
        m.apply_point(p)
    }

    /// Apply `m` to the direction `v` (no translation, no divide).
    pub fn vector(v: Vec3, m: &Mat4) -> Vec3 {
        m.apply_vector(v)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.matrix
    }
}
