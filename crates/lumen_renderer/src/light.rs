//! Light sources.

use crate::{Color, Ray};
use lumen_math::{Vec3, RAY_EPSILON};

/// Trait for lights that illuminate shading points.
pub trait Light: Send + Sync {
    /// Aim `ray` (whose origin is the shading point) at the light.
    ///
    /// On success the ray's direction points toward the light, `t` is the
    /// distance to it and the hit is cleared, so the ray can be used
    /// directly as a shadow ray. Returns the incident radiance, or `None`
    /// if this light cannot reach the point at all.
    fn illuminate(&self, ray: &mut Ray) -> Option<Color>;

    /// Whether shading should test for occluders before using this light.
    fn casts_shadow(&self) -> bool;

    /// Position the light emits from.
    fn origin(&self) -> Vec3;

    /// Move the light, e.g. between animation frames.
    fn set_origin(&mut self, origin: Vec3);

    /// Number of `illuminate` calls a shader should average.
    fn num_samples(&self) -> usize {
        1
    }
}

/// Omnidirectional point light with inverse-square falloff.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    intensity: Color,
    origin: Vec3,
    cast_shadow: bool,
}

impl PointLight {
    pub fn new(intensity: Color, origin: Vec3, cast_shadow: bool) -> Self {
        Self {
            intensity,
            origin,
            cast_shadow,
        }
    }

    pub fn intensity(&self) -> Color {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: Color) {
        self.intensity = intensity;
    }
}

impl Light for PointLight {
    fn illuminate(&self, ray: &mut Ray) -> Option<Color> {
        let to_light = self.origin - ray.origin;
        let distance = to_light.length();
        // Shading point sits on the light
        if distance < RAY_EPSILON {
            return None;
        }

        ray.direction = to_light / distance;
        ray.t = distance;
        ray.hit = None;
        Some(self.intensity / (distance * distance))
    }

    fn casts_shadow(&self) -> bool {
        self.cast_shadow
    }

    fn origin(&self) -> Vec3 {
        self.origin
    }

    fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }
}
