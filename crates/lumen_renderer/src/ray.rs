//! Ray type for ray tracing.
//!
//! A ray carries its origin and unit direction plus the mutable state of
//! the closest hit found so far: distance `t`, barycentric/parametric
//! coordinates `(u, v)` and a handle to the hit primitive.

use crate::{Intersection, PrimId};
use lumen_math::Vec3;

/// A ray with closest-hit state.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    pub origin: Vec3,
    /// Unit direction vector
    pub direction: Vec3,
    /// Distance to the closest hit so far (+infinity when nothing was hit)
    pub t: f32,
    /// First hit coordinate (barycentric for triangles)
    pub u: f32,
    /// Second hit coordinate
    pub v: f32,
    /// Primitive that produced the closest hit
    pub hit: Option<PrimId>,
}

impl Ray {
    /// Create a ray with no hit. The direction is normalized.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            t: f32::INFINITY,
            u: 0.0,
            v: 0.0,
            hit: None,
        }
    }

    /// Re-aim the ray and clear its hit state.
    #[inline]
    pub fn reset(&mut self, origin: Vec3, direction: Vec3) {
        *self = Self::new(origin, direction);
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// Point of the current closest hit.
    #[inline]
    pub fn hit_point(&self) -> Vec3 {
        self.at(self.t)
    }

    /// Component-wise reciprocal of the direction, for slab tests.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.direction.recip()
    }

    /// Store a closer hit. This is the only place hit state is written.
    #[inline]
    pub fn record(&mut self, hit: Intersection, id: PrimId) {
        self.t = hit.t;
        self.u = hit.u;
        self.v = hit.v;
        self.hit = Some(id);
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}
