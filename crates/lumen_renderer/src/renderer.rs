//! Frame rendering.
//!
//! Rows of the output image are traced in parallel with rayon. Each worker
//! owns its ray, sample buffer and RNG and writes only its own row, so the
//! scene is shared read-only and the image needs no locking.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Camera, Color, Ray, SampleStrategy, Sampler, Scene, SceneError};
use lumen_math::Vec2;

/// Errors that abort a frame before any pixel is traced.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Samples per pixel must be at least 1")]
    ZeroSamples,
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Placement of samples inside each pixel
    pub strategy: SampleStrategy,
    /// Seed for jittered and random sampling
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            strategy: SampleStrategy::Center,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn with_samples(mut self, samples_per_pixel: u32, strategy: SampleStrategy) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Quantize a linear color to 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let q = |c: f32| (255.0 * clamp_01(c)).round() as u8;
    [q(color.x), q(color.y), q(color.z)]
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    /// Linear RGB, row-major, row 0 at the top
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Get the pixel at (x, y), or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y). Writes outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Convert to packed RGB bytes, clamped to [0, 1] first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgb8(c)).collect()
    }

    /// Convert to an `image` buffer for encoding.
    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(self.get(x, y).map(color_to_rgb8).unwrap_or([0, 0, 0]))
        })
    }
}

/// Render a single pixel, averaging the given sub-pixel offsets.
pub fn render_pixel(
    scene: &Scene,
    camera: &dyn Camera,
    ray: &mut Ray,
    x: u32,
    y: u32,
    samples: &[Vec2],
) -> Color {
    if samples.is_empty() {
        return scene.background();
    }

    let mut pixel_color = Color::ZERO;
    for &sample in samples {
        camera.init_ray(ray, x, y, sample);
        pixel_color += scene.trace_ray(ray);
    }

    // Average the samples
    pixel_color / samples.len() as f32
}

/// Render the active camera's full frame.
///
/// The acceleration structure must be current; a stale one is traced as
/// is, with a warning.
pub fn render(scene: &Scene, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    if config.samples_per_pixel == 0 {
        return Err(RenderError::ZeroSamples);
    }
    let camera = scene.active_camera()?;
    if scene.needs_rebuild() {
        log::warn!("Rendering with a stale acceleration structure; call build_accel_structure first");
    }

    let res = camera.resolution();
    let sampler = Sampler::new(config.strategy, config.samples_per_pixel as usize);
    let mut image = ImageBuffer::new(res.width, res.height);
    let start = Instant::now();

    image
        .pixels
        .par_chunks_mut(res.width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let seed = config.seed ^ (y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut samples = Vec::with_capacity(sampler.samples_per_pixel());
            let mut ray = Ray::default();

            for (x, pixel) in row.iter_mut().enumerate() {
                sampler.generate(&mut rng, &mut samples);
                *pixel = render_pixel(scene, camera, &mut ray, x as u32, y as u32, &samples);
            }
        });

    log::info!(
        "Rendered {}x{} ({} spp, {:?}) in {:.2?}",
        res.width,
        res.height,
        sampler.samples_per_pixel(),
        config.strategy,
        start.elapsed()
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        FlatShader, PerspectiveCamera, PhongShader, PointLight, Resolution, Shader, Sphere,
    };
    use lumen_math::Vec3;
    use std::sync::Arc;

    fn sphere_scene(width: u32, height: u32) -> Scene {
        let mut scene = Scene::new(Color::new(0.0, 0.0, 1.0));
        scene.add_camera(
            PerspectiveCamera::new(
                Resolution::new(width, height),
                Vec3::new(0.0, 0.0, -5.0),
                Vec3::Z,
                Vec3::Y,
                60.0,
            )
            .unwrap(),
        );
        let red: Arc<dyn Shader> = Arc::new(FlatShader::new(Color::new(1.0, 0.0, 0.0)));
        scene.add_primitive(Sphere::new(red, Vec3::ZERO, 1.0));
        scene.build_accel_structure(30, 3);
        scene
    }

    #[test]
    fn test_image_buffer() {
        let mut image = ImageBuffer::new(2, 2);
        image.set(1, 0, Color::new(2.0, 0.5, -1.0));
        image.set(5, 5, Color::ONE);

        assert_eq!(image.get(1, 0), Some(Color::new(2.0, 0.5, -1.0)));
        assert_eq!(image.get(2, 0), None);
        assert_eq!(&image.to_rgb8()[3..6], &[255, 128, 0]);

        let rgb = image.to_image();
        assert_eq!(rgb.dimensions(), (2, 2));
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 128, 0]);
    }

    #[test]
    fn test_render_center_and_corner() {
        let scene = sphere_scene(21, 21);
        let image = render(&scene, &RenderConfig::default()).unwrap();

        assert_eq!(image.get(10, 10), Some(Color::new(1.0, 0.0, 0.0)));
        assert_eq!(image.get(0, 0), Some(Color::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_supersampling_blends_edges() {
        let _ = env_logger::builder().is_test(true).try_init();
        let scene = sphere_scene(31, 31);
        let config = RenderConfig::default()
            .with_samples(16, SampleStrategy::Stratified)
            .with_seed(9);
        let image = render(&scene, &config).unwrap();

        // Some pixel along the silhouette mixes sphere and background
        let blended = image.pixels.iter().any(|c| c.x > 0.05 && c.z > 0.05);
        assert!(blended);

        // Deterministic for a fixed seed
        let again = render(&scene, &config).unwrap();
        assert_eq!(image.pixels, again.pixels);
    }

    #[test]
    fn test_render_errors() {
        let scene = Scene::new(Color::ZERO);
        assert!(matches!(
            render(&scene, &RenderConfig::default()),
            Err(RenderError::Scene(SceneError::NoCamera))
        ));

        let scene = sphere_scene(4, 4);
        let config = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(render(&scene, &config), Err(RenderError::ZeroSamples)));
    }

    #[test]
    fn test_lit_render_is_brighter_toward_light() {
        let mut scene = Scene::new(Color::ZERO);
        scene.add_camera(
            PerspectiveCamera::new(Resolution::new(32, 32), Vec3::new(0.0, 0.0, -5.0), Vec3::Z, Vec3::Y, 45.0)
                .unwrap(),
        );
        let phong: Arc<dyn Shader> = Arc::new(PhongShader::new(Color::ONE, 0.1, 0.9, 0.0, 1.0));
        scene.add_primitive(Sphere::new(phong, Vec3::ZERO, 1.0));
        scene.add_light(PointLight::new(Color::splat(50.0), Vec3::new(0.0, 5.0, -5.0), true));
        scene.build_accel_structure(30, 3);

        let image = render(&scene, &RenderConfig::default()).unwrap();
        // Row 0 is the top of the frame
        let top = image.get(16, 10).unwrap();
        let bottom = image.get(16, 22).unwrap();
        assert!(top.x > bottom.x);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = RenderConfig::default()
            .with_samples(4, SampleStrategy::Random)
            .with_seed(42);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"random\""));
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        // Missing fields take their defaults
        let partial: RenderConfig = serde_json::from_str(r#"{"samples_per_pixel": 8}"#).unwrap();
        assert_eq!(partial.samples_per_pixel, 8);
        assert_eq!(partial.strategy, SampleStrategy::Center);
    }
}
