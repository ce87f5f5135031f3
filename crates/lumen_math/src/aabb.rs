use crate::Vec3;

/// Axis-Aligned Bounding Box for the acceleration structure.
///
/// Stored as a min and a max corner. An empty box has `min > max` on every
/// axis and grows monotonically through [`Aabb::extend`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Minimum thickness along each axis after [`Aabb::padded`].
const MIN_EXTENT: f32 = 0.0001;

impl Aabb {
    /// Box that contains nothing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Box that contains everything (unbounded primitives).
    pub const UNIVERSE: Aabb = Aabb {
        min: Vec3::splat(f32::NEG_INFINITY),
        max: Vec3::splat(f32::INFINITY),
    };

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Grow the box to include `point`.
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// True if the box contains no point at all.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// True if both corners are finite (the box is bounded and not empty).
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Returns true if `point` lies inside the box (boundary included).
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Widen flat axes so planar geometry still yields a hittable volume.
    pub fn padded(&self) -> Aabb {
        if !self.is_finite() {
            return *self;
        }
        let mut out = *self;
        for axis in 0..3 {
            if out.max[axis] - out.min[axis] < MIN_EXTENT {
                out.min[axis] -= MIN_EXTENT * 0.5;
                out.max[axis] += MIN_EXTENT * 0.5;
            }
        }
        out
    }

    /// Slab test against the ray segment `[t_min, t_max]`.
    ///
    /// `inv_dir` is the component-wise reciprocal of the ray direction.
    /// Returns the distance at which the ray enters the box (clamped to
    /// `t_min`), or `None` if the segment misses it.
    pub fn hit(&self, origin: Vec3, inv_dir: Vec3, mut t_min: f32, mut t_max: f32) -> Option<f32> {
        for axis in 0..3 {
            let inv = inv_dir[axis];
            let mut t0 = (self.min[axis] - origin[axis]) * inv;
            let mut t1 = (self.max[axis] - origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max < t_min {
                return None;
            }
        }
        Some(t_min)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
