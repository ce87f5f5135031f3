//! Primitive trait for ray-surface intersection.

use std::fmt;
use std::sync::Arc;

use crate::{Ray, Shader};
use lumen_math::{Aabb, Mat4, Vec2, Vec3};

/// Handle to a primitive owned by a [`Scene`](crate::Scene).
///
/// Rays refer to their hit primitive through this index; they never own it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimId(usize);

impl PrimId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the primitive in the scene's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PrimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A successful intersection test, not yet committed to the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// Trait for surfaces that can be hit by rays.
pub trait Primitive: Send + Sync {
    /// Test the ray against this primitive.
    ///
    /// Returns a hit only if it lies beyond [`RAY_EPSILON`](lumen_math::RAY_EPSILON)
    /// and strictly closer than the ray's current `t`. The ray itself is
    /// not modified; callers commit accepted hits with [`Ray::record`].
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;

    /// Shading normal at the ray's recorded hit (unit length).
    fn normal(&self, ray: &Ray) -> Vec3;

    /// Texture coordinates at the ray's recorded hit.
    fn texture_coords(&self, ray: &Ray) -> Vec2;

    /// Get the axis-aligned bounding box. Unbounded surfaces return
    /// [`Aabb::UNIVERSE`].
    fn bounding_box(&self) -> Aabb;

    /// Replace the geometry with its image under `m`.
    fn transform(&mut self, m: &Mat4);

    /// Shader evaluated when this primitive is the closest hit.
    fn shader(&self) -> &Arc<dyn Shader>;
}
