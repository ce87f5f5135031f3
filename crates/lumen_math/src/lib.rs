// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod transform;

pub use aabb::Aabb;
pub use transform::{Mat4Ext, Transform};

/// Minimum accepted hit distance along a ray.
///
/// Hits closer than this are treated as the surface the ray just left
/// (self-intersection acne) and rejected.
pub const RAY_EPSILON: f32 = 1e-4;

/// Tolerance for determinants and denominators that signal a ray running
/// parallel to a surface.
pub const PARALLEL_EPSILON: f32 = 1e-8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsilons_are_ordered() {
        assert!(PARALLEL_EPSILON < RAY_EPSILON);
        assert!(RAY_EPSILON > 0.0);
    }

    #[test]
    fn test_glam_reexport() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
    }
}
