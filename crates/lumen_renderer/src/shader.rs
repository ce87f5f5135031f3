//! Shaders compute the radiance leaving a surface toward the viewer.

use std::sync::Arc;

use crate::{Ray, Scene};
use lumen_core::Texture;
use lumen_math::{Vec2, Vec3, PARALLEL_EPSILON};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Surface data at the closest hit, handed to [`Shader::shade`].
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Point of intersection
    pub point: Vec3,
    /// Shading normal (always points against the incoming ray)
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Interpolated texture coordinates
    pub uv: Vec2,
    /// Unit direction of the incoming ray
    pub direction: Vec3,
    /// Distance along the incoming ray
    pub t: f32,
}

impl HitRecord {
    /// Build a record for the hit stored in `ray`.
    pub fn new(ray: &Ray, outward_normal: Vec3, uv: Vec2) -> Self {
        let mut rec = Self {
            point: ray.hit_point(),
            normal: outward_normal,
            front_face: true,
            uv,
            direction: ray.direction,
            t: ray.t,
        };
        rec.set_face_normal(outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    pub fn set_face_normal(&mut self, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = self.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for surface shading.
pub trait Shader: Send + Sync {
    /// Radiance leaving `hit` along the reversed incoming direction.
    fn shade(&self, scene: &Scene, hit: &HitRecord) -> Color;
}

/// Base color from an optional texture, falling back to a flat color.
fn base_color(color: Color, texture: Option<&Arc<Texture>>, uv: Vec2) -> Color {
    texture.and_then(|t| t.sample(uv)).unwrap_or(color)
}

fn checked_texture(texture: Arc<Texture>) -> Arc<Texture> {
    if texture.is_empty() {
        log::warn!("Shader texture is empty, using the flat color instead");
    }
    texture
}

/// Reflect a vector around a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Unlit constant color, optionally textured.
pub struct FlatShader {
    color: Color,
    texture: Option<Arc<Texture>>,
}

impl FlatShader {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(checked_texture(texture));
        self
    }
}

impl Shader for FlatShader {
    fn shade(&self, _scene: &Scene, hit: &HitRecord) -> Color {
        base_color(self.color, self.texture.as_ref(), hit.uv)
    }
}

/// Headlight shading: brightness follows the angle to the viewer.
///
/// Useful for checking geometry and normals without any lights.
pub struct EyelightShader {
    color: Color,
}

impl EyelightShader {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Shader for EyelightShader {
    fn shade(&self, _scene: &Scene, hit: &HitRecord) -> Color {
        self.color * hit.normal.dot(-hit.direction).max(0.0)
    }
}

/// Phong reflectance: ambient + diffuse + specular with hard shadows.
pub struct PhongShader {
    color: Color,
    /// Ambient coefficient
    ka: f32,
    /// Diffuse coefficient
    kd: f32,
    /// Specular coefficient
    ks: f32,
    /// Specular exponent
    shininess: f32,
    texture: Option<Arc<Texture>>,
}

impl PhongShader {
    pub fn new(color: Color, ka: f32, kd: f32, ks: f32, shininess: f32) -> Self {
        Self {
            color,
            ka,
            kd,
            ks,
            shininess,
            texture: None,
        }
    }

    /// Modulate the ambient and diffuse terms by a texture.
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(checked_texture(texture));
        self
    }
}

impl Shader for PhongShader {
    fn shade(&self, scene: &Scene, hit: &HitRecord) -> Color {
        let base = base_color(self.color, self.texture.as_ref(), hit.uv);
        let mirrored = reflect(hit.direction, hit.normal);

        let mut diffuse = Color::ZERO;
        let mut specular = Color::ZERO;

        for light in scene.lights() {
            let samples = light.num_samples().max(1);
            let mut light_diffuse = Color::ZERO;
            let mut light_specular = Color::ZERO;

            for _ in 0..samples {
                let mut shadow = Ray::new(hit.point, hit.normal);
                let Some(intensity) = light.illuminate(&mut shadow) else {
                    continue;
                };

                let cos_ln = shadow.direction.dot(hit.normal);
                if cos_ln < PARALLEL_EPSILON {
                    continue;
                }
                if light.casts_shadow() && scene.occluded(&shadow) {
                    continue;
                }

                light_diffuse += intensity * cos_ln;
                let cos_lr = shadow.direction.dot(mirrored).max(0.0);
                light_specular += intensity * cos_lr.powf(self.shininess);
            }

            diffuse += light_diffuse / samples as f32;
            specular += light_specular / samples as f32;
        }

        self.ka * base * scene.ambient() + self.kd * diffuse * base + self.ks * specular
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PointLight, Triangle};

    fn record(normal: Vec3, direction: Vec3) -> HitRecord {
        HitRecord {
            point: Vec3::ZERO,
            normal,
            front_face: true,
            uv: Vec2::ZERO,
            direction,
            t: 1.0,
        }
    }

    #[test]
    fn test_face_normal_flips_toward_ray() {
        let mut rec = record(Vec3::Y, Vec3::Y);
        rec.set_face_normal(Vec3::Y);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Y);
    }

    #[test]
    fn test_reflect() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_flat_texture_fallback() {
        let scene = Scene::new(Color::ZERO);
        let rec = record(Vec3::Y, -Vec3::Y);

        let shader = FlatShader::new(Vec3::new(0.2, 0.4, 0.6)).with_texture(Arc::new(Texture::empty()));
        assert_eq!(shader.shade(&scene, &rec), Vec3::new(0.2, 0.4, 0.6));

        let red = Texture::solid_color(Vec3::X);
        let shader = FlatShader::new(Vec3::ONE).with_texture(Arc::new(red));
        assert!((shader.shade(&scene, &rec) - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_eyelight() {
        let scene = Scene::new(Color::ZERO);
        let shader = EyelightShader::new(Vec3::ONE);

        let head_on = shader.shade(&scene, &record(Vec3::Y, -Vec3::Y));
        assert!((head_on - Vec3::ONE).length() < 1e-6);

        let grazing = Vec3::new(1.0, -1.0, 0.0).normalize();
        let angled = shader.shade(&scene, &record(Vec3::Y, grazing));
        assert!((angled.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_phong_ambient_and_diffuse() {
        let mut scene = Scene::new(Color::ZERO).with_ambient(Vec3::splat(0.5));
        scene.add_light(PointLight::new(Vec3::splat(100.0), Vec3::new(0.0, 10.0, 0.0), true));

        let shader = PhongShader::new(Vec3::ONE, 0.2, 0.8, 0.0, 10.0);
        let c = shader.shade(&scene, &record(Vec3::Y, -Vec3::Y));

        // ambient 0.2 * 0.5, diffuse 0.8 * (100 / 100) * 1
        assert!((c.x - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_phong_light_behind_surface() {
        let mut scene = Scene::new(Color::ZERO);
        scene.add_light(PointLight::new(Vec3::ONE, Vec3::new(0.0, -10.0, 0.0), true));

        let shader = PhongShader::new(Vec3::ONE, 0.0, 1.0, 1.0, 10.0);
        let c = shader.shade(&scene, &record(Vec3::Y, -Vec3::Y));
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_phong_grazing_light_is_skipped() {
        let mut scene = Scene::new(Color::ZERO);
        scene.add_light(PointLight::new(Vec3::splat(100.0), Vec3::new(10.0, 1e-9, 0.0), true));

        let shader = PhongShader::new(Vec3::ONE, 0.0, 1.0, 0.0, 10.0);
        let c = shader.shade(&scene, &record(Vec3::Y, -Vec3::Y));
        assert_eq!(c, Color::ZERO);
    }

    fn occluded_scene(cast_shadow: bool) -> Scene {
        let mut scene = Scene::new(Color::ZERO);
        scene.add_light(PointLight::new(Vec3::splat(100.0), Vec3::new(0.0, 10.0, 0.0), cast_shadow));

        // Large occluder between the shading point and the light
        let blocker: Arc<dyn Shader> = Arc::new(FlatShader::new(Vec3::ONE));
        scene.add_primitive(Triangle::new(
            blocker,
            Vec3::new(-5.0, 5.0, -5.0),
            Vec3::new(5.0, 5.0, -5.0),
            Vec3::new(0.0, 5.0, 10.0),
        ));
        scene.build_accel_structure(30, 3);
        scene
    }

    #[test]
    fn test_phong_shadowed_light_contributes_nothing() {
        let shader = PhongShader::new(Vec3::ONE, 0.0, 1.0, 1.0, 10.0);
        let rec = record(Vec3::Y, -Vec3::Y);

        let scene = occluded_scene(true);
        assert_eq!(shader.shade(&scene, &rec), Color::ZERO);

        // The same occluder is ignored by a light that casts no shadow
        let scene = occluded_scene(false);
        let c = shader.shade(&scene, &rec);
        assert!((c.x - 2.0).abs() < 1e-4);
    }
}
