//! Cameras for primary ray generation.
//!
//! A camera maps a pixel plus a sub-pixel sample offset to a world-space
//! ray. The perspective camera keeps an orthonormal basis derived from its
//! view direction and up vector; the target camera additionally keeps that
//! direction pointed at a look-at point.

use crate::Ray;
use lumen_math::{Vec2, Vec3, PARALLEL_EPSILON, RAY_EPSILON};
use thiserror::Error;

/// Errors raised by invalid camera parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Camera resolution must be non-zero, got {width}x{height}")]
    ZeroResolution { width: u32, height: u32 },

    #[error("Camera view direction must have non-zero length")]
    ZeroDirection,

    #[error("Field of view must be between 0 and 180 degrees, got {0}")]
    InvalidAngle(f32),

    #[error("Camera target coincides with its position")]
    TargetAtPosition,
}

pub type CameraResult<T> = Result<T, CameraError>;

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Sub-pixel offset of the pixel center.
pub const PIXEL_CENTER: Vec2 = Vec2::splat(0.5);

/// Trait for cameras that generate primary rays.
pub trait Camera: Send + Sync {
    fn resolution(&self) -> Resolution;

    fn aspect_ratio(&self) -> f32 {
        self.resolution().aspect_ratio()
    }

    /// Aim `ray` through pixel `(x, y)` at sub-pixel offset `sample` in
    /// `[0, 1)^2`. Clears any hit state on the ray.
    fn init_ray(&self, ray: &mut Ray, x: u32, y: u32, sample: Vec2);

    /// Convenience wrapper around [`Camera::init_ray`].
    fn generate_ray(&self, x: u32, y: u32, sample: Vec2) -> Ray {
        let mut ray = Ray::default();
        self.init_ray(&mut ray, x, y, sample);
        ray
    }

    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3) -> CameraResult<()>;

    /// Unit view direction.
    fn direction(&self) -> Vec3;
    fn set_direction(&mut self, direction: Vec3) -> CameraResult<()>;

    /// Vertical field of view in degrees.
    fn angle(&self) -> f32;
    fn set_angle(&mut self, degrees: f32) -> CameraResult<()>;

    /// Turn the camera toward `target`.
    fn look_at(&mut self, target: Vec3) -> CameraResult<()> {
        let direction = target - self.position();
        if direction.length() < RAY_EPSILON {
            return Err(CameraError::TargetAtPosition);
        }
        self.set_direction(direction)
    }
}

fn check_angle(degrees: f32) -> CameraResult<f32> {
    if degrees > 0.0 && degrees < 180.0 {
        Ok(degrees)
    } else {
        Err(CameraError::InvalidAngle(degrees))
    }
}

fn check_direction(direction: Vec3) -> CameraResult<Vec3> {
    if direction.length() < PARALLEL_EPSILON {
        Err(CameraError::ZeroDirection)
    } else {
        Ok(direction.normalize())
    }
}

/// Pinhole perspective camera.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    resolution: Resolution,
    position: Vec3,
    direction: Vec3,
    up: Vec3,

    // Derived basis, refreshed by update_basis()
    x_axis: Vec3,
    y_axis: Vec3,
    z_axis: Vec3,
    /// Distance to the image plane spanning [-1, 1] vertically
    focus: f32,
}

impl PerspectiveCamera {
    /// Create a camera at `position` looking along `direction`.
    ///
    /// `angle` is the vertical field of view in degrees.
    pub fn new(
        resolution: Resolution,
        position: Vec3,
        direction: Vec3,
        up: Vec3,
        angle: f32,
    ) -> CameraResult<Self> {
        if resolution.width == 0 || resolution.height == 0 {
            return Err(CameraError::ZeroResolution {
                width: resolution.width,
                height: resolution.height,
            });
        }
        let direction = check_direction(direction)?;
        let angle = check_angle(angle)?;

        let mut camera = Self {
            resolution,
            position,
            direction,
            up,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            z_axis: Vec3::Z,
            focus: 1.0 / (angle.to_radians() * 0.5).tan(),
        };
        camera.update_basis();
        Ok(camera)
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
        self.update_basis();
    }

    /// Camera `(x, y, z)` axes. `z` is the view direction.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.x_axis, self.y_axis, self.z_axis)
    }

    pub fn focus(&self) -> f32 {
        self.focus
    }

    /// Rebuild the basis. The stored up vector is never replaced; a
    /// degenerate one only affects this update.
    fn update_basis(&mut self) {
        let z = self.direction;
        let mut x = z.cross(self.up.normalize_or_zero());
        if x.length() < PARALLEL_EPSILON.sqrt() {
            // Up is parallel to the view direction, pick a world axis instead
            let fallback = if z.dot(Vec3::Y).abs() > 0.9 { Vec3::Z } else { Vec3::Y };
            log::warn!(
                "Camera up {:?} is parallel to direction {:?}, using {:?}",
                self.up,
                z,
                fallback
            );
            x = z.cross(fallback);
        }

        self.z_axis = z;
        self.x_axis = x.normalize();
        self.y_axis = z.cross(self.x_axis).normalize();
    }
}

impl Camera for PerspectiveCamera {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn init_ray(&self, ray: &mut Ray, x: u32, y: u32, sample: Vec2) {
        let res = self.resolution;
        // Screen space coordinates in [-1, 1]
        let sscx = 2.0 * (x as f32 + sample.x) / res.width as f32 - 1.0;
        let sscy = 2.0 * (y as f32 + sample.y) / res.height as f32 - 1.0;

        let dir = self.aspect_ratio() * sscx * self.x_axis + sscy * self.y_axis + self.focus * self.z_axis;
        ray.reset(self.position, dir);
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) -> CameraResult<()> {
        self.position = position;
        Ok(())
    }

    fn direction(&self) -> Vec3 {
        self.direction
    }

    fn set_direction(&mut self, direction: Vec3) -> CameraResult<()> {
        self.direction = check_direction(direction)?;
        self.update_basis();
        Ok(())
    }

    fn angle(&self) -> f32 {
        2.0 * (1.0 / self.focus).atan().to_degrees()
    }

    fn set_angle(&mut self, degrees: f32) -> CameraResult<()> {
        let angle = check_angle(degrees)?;
        self.focus = 1.0 / (angle.to_radians() * 0.5).tan();
        Ok(())
    }
}

/// Perspective camera that always faces a target point.
///
/// Moving the camera or the target re-aims it; setting the direction moves
/// the target along the new direction at the same distance.
#[derive(Debug, Clone)]
pub struct TargetCamera {
    inner: PerspectiveCamera,
    target: Vec3,
}

impl TargetCamera {
    pub fn new(
        resolution: Resolution,
        position: Vec3,
        target: Vec3,
        up: Vec3,
        angle: f32,
    ) -> CameraResult<Self> {
        if (target - position).length() < RAY_EPSILON {
            return Err(CameraError::TargetAtPosition);
        }
        let inner = PerspectiveCamera::new(resolution, position, target - position, up, angle)?;
        Ok(Self { inner, target })
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec3) -> CameraResult<()> {
        let direction = target - self.inner.position;
        if direction.length() < RAY_EPSILON {
            return Err(CameraError::TargetAtPosition);
        }
        self.inner.set_direction(direction)?;
        self.target = target;
        Ok(())
    }

    pub fn perspective(&self) -> &PerspectiveCamera {
        &self.inner
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.inner.set_up(up);
    }
}

impl Camera for TargetCamera {
    fn resolution(&self) -> Resolution {
        self.inner.resolution()
    }

    fn init_ray(&self, ray: &mut Ray, x: u32, y: u32, sample: Vec2) {
        self.inner.init_ray(ray, x, y, sample);
    }

    fn position(&self) -> Vec3 {
        self.inner.position()
    }

    fn set_position(&mut self, position: Vec3) -> CameraResult<()> {
        let direction = self.target - position;
        if direction.length() < RAY_EPSILON {
            return Err(CameraError::TargetAtPosition);
        }
        self.inner.set_direction(direction)?;
        self.inner.set_position(position)
    }

    fn direction(&self) -> Vec3 {
        self.inner.direction()
    }

    fn set_direction(&mut self, direction: Vec3) -> CameraResult<()> {
        let distance = (self.target - self.inner.position).length();
        self.inner.set_direction(direction)?;
        self.target = self.inner.position + self.inner.direction * distance;
        Ok(())
    }

    fn angle(&self) -> f32 {
        self.inner.angle()
    }

    fn set_angle(&mut self, degrees: f32) -> CameraResult<()> {
        self.inner.set_angle(degrees)
    }

    fn look_at(&mut self, target: Vec3) -> CameraResult<()> {
        self.set_target(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Resolution::new(100, 100),
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::Z,
            Vec3::Y,
            90.0,
        )
        .unwrap()
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_angle_round_trip() {
        let mut cam = camera();
        for angle in [1.0, 30.0, 45.0, 60.0, 90.0, 120.0, 179.0] {
            cam.set_angle(angle).unwrap();
            assert!((cam.angle() - angle).abs() < 1e-3, "angle {angle}");
        }
        assert!((camera().focus() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut cam = camera();
        assert_eq!(cam.set_angle(0.0), Err(CameraError::InvalidAngle(0.0)));
        assert_eq!(cam.set_angle(180.0), Err(CameraError::InvalidAngle(180.0)));
        assert_eq!(cam.set_direction(Vec3::ZERO), Err(CameraError::ZeroDirection));
        // Failed setters leave the camera untouched
        assert!((cam.angle() - 90.0).abs() < 1e-3);
        assert!(close(cam.direction(), Vec3::Z));

        let err = PerspectiveCamera::new(Resolution::new(0, 10), Vec3::ZERO, Vec3::Z, Vec3::Y, 60.0);
        assert!(matches!(err, Err(CameraError::ZeroResolution { .. })));
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let cam = PerspectiveCamera::new(
            Resolution::new(64, 48),
            Vec3::ONE,
            Vec3::new(1.0, -0.5, 2.0),
            Vec3::new(0.1, 1.0, 0.0),
            50.0,
        )
        .unwrap();
        let (x, y, z) = cam.basis();

        for v in [x, y, z] {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
        assert!(x.dot(y).abs() < 1e-5);
        assert!(y.dot(z).abs() < 1e-5);
        assert!(z.dot(x).abs() < 1e-5);
        assert!(close(z, Vec3::new(1.0, -0.5, 2.0).normalize()));
    }

    #[test]
    fn test_center_ray() {
        let cam = camera();
        let ray = cam.generate_ray(50, 50, Vec2::ZERO);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, -10.0));
        assert!(close(ray.direction, Vec3::Z));
        assert_eq!(ray.t, f32::INFINITY);
    }

    #[test]
    fn test_corner_rays() {
        let cam = camera();

        // Top-left pixel corner: 90 degree fov puts it at 45 degrees on both axes
        let ray = cam.generate_ray(0, 0, Vec2::ZERO);
        let expected = Vec3::new(1.0, 1.0, 1.0).normalize();
        assert!(close(ray.direction, expected), "{:?}", ray.direction);

        // Image rows go down, columns go right
        let below = cam.generate_ray(50, 99, PIXEL_CENTER);
        assert!(below.direction.y < 0.0);
        let right = cam.generate_ray(99, 50, PIXEL_CENTER);
        assert!(right.direction.x < 0.0);
    }

    #[test]
    fn test_aspect_ratio_widens_horizontally() {
        let cam = PerspectiveCamera::new(Resolution::new(200, 100), Vec3::ZERO, Vec3::Z, Vec3::Y, 90.0).unwrap();
        assert!((cam.aspect_ratio() - 2.0).abs() < 1e-6);

        let ray = cam.generate_ray(0, 50, Vec2::ZERO);
        assert!(close(ray.direction, Vec3::new(2.0, 0.0, 1.0).normalize()));
    }

    #[test]
    fn test_degenerate_up_is_replaced() {
        let cam = PerspectiveCamera::new(Resolution::new(10, 10), Vec3::ZERO, Vec3::Y, Vec3::Y, 60.0).unwrap();
        let (x, y, z) = cam.basis();
        assert!(x.is_finite() && y.is_finite() && z.is_finite());
        assert!((x.length() - 1.0).abs() < 1e-5);
        assert!(x.dot(z).abs() < 1e-5);
        assert!(close(y, -Vec3::Z) || close(y, Vec3::Z));
        // The caller's up vector is kept
        assert_eq!(cam.up(), Vec3::Y);

        let cam = PerspectiveCamera::new(Resolution::new(10, 10), Vec3::ZERO, Vec3::X, -Vec3::X, 60.0).unwrap();
        assert_eq!(cam.up(), -Vec3::X);
        assert!(cam.basis().0.is_finite());
    }

    #[test]
    fn test_basis_restored_after_passing_pole() {
        let mut cam = PerspectiveCamera::new(Resolution::new(10, 10), Vec3::ZERO, Vec3::X, Vec3::Y, 60.0).unwrap();
        let before = cam.basis();

        cam.set_direction(Vec3::Y).unwrap();
        assert!(cam.basis().0.is_finite());
        cam.set_direction(Vec3::X).unwrap();

        let after = cam.basis();
        assert!(close(before.0, after.0), "{:?} vs {:?}", before.0, after.0);
        assert!(close(before.1, after.1));
        assert_eq!(cam.up(), Vec3::Y);
    }

    #[test]
    fn test_tiny_direction_is_rejected() {
        let mut cam = camera();
        assert_eq!(cam.set_direction(Vec3::splat(1e-20)), Err(CameraError::ZeroDirection));
        assert_eq!(cam.set_direction(Vec3::new(1e-10, 0.0, 0.0)), Err(CameraError::ZeroDirection));
        assert!(close(cam.direction(), Vec3::Z));
    }

    #[test]
    fn test_look_at() {
        let mut cam = camera();
        cam.look_at(Vec3::new(0.0, 0.0, 0.0)).unwrap();
        assert!(close(cam.direction(), Vec3::Z));
        assert_eq!(cam.look_at(cam.position()), Err(CameraError::TargetAtPosition));
    }

    #[test]
    fn test_target_camera_tracks_target() {
        let mut cam = TargetCamera::new(
            Resolution::new(32, 32),
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0,
        )
        .unwrap();
        assert!(close(cam.direction(), Vec3::Z));

        cam.set_position(Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert!(close(cam.direction(), -Vec3::X));

        cam.set_target(Vec3::new(10.0, 5.0, 0.0)).unwrap();
        assert!(close(cam.direction(), Vec3::Y));

        // Setting the direction keeps the target at the same distance
        cam.set_direction(-Vec3::Z).unwrap();
        assert!(close(cam.target(), Vec3::new(10.0, 0.0, -5.0)));

        assert_eq!(cam.set_position(cam.target()), Err(CameraError::TargetAtPosition));
        assert_eq!(cam.set_target(cam.position()), Err(CameraError::TargetAtPosition));

        let err = TargetCamera::new(Resolution::new(8, 8), Vec3::ONE, Vec3::ONE, Vec3::Y, 60.0);
        assert!(matches!(err, Err(CameraError::TargetAtPosition)));
    }
}
