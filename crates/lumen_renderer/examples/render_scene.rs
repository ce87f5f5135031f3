//! Animated demo scene.
//!
//! Renders a short camera move around a ground plane, two spheres and a cone lit
//! by two point lights, saving one PNG per frame.
//!
//! ```text
//! cargo run --release --example render_scene -- [output_dir] [texture.png]
//! RUST_LOG=info for BVH and frame timings
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumen_core::Texture;
use lumen_renderer::{
    render, Color, EyelightShader, FlatShader, PhongShader, Plane, PointLight,
    RenderConfig, Resolution, SampleStrategy, Scene, Shader, Solid, TargetCamera, Transform, Vec3,
};

const FRAMES: usize = 8;
const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "frames".to_string()));
    let texture_path = args.next();

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    // A missing texture is not fatal, the shader falls back to its color
    let texture = match texture_path {
        Some(path) => Texture::open(&path).unwrap_or_else(|e| {
            log::warn!("Could not load texture {}: {}", path, e);
            Texture::empty()
        }),
        None => Texture::empty(),
    };

    let mut scene = Scene::new(Color::new(0.05, 0.07, 0.12)).with_ambient(Color::splat(0.3));

    let camera = TargetCamera::new(
        Resolution::new(WIDTH, HEIGHT),
        Vec3::new(0.0, 3.0, -9.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::Y,
        50.0,
    )?;
    let cam_index = scene.add_camera(camera);
    scene.set_active_camera(cam_index)?;

    let key_light = scene.add_light(PointLight::new(Color::splat(60.0), Vec3::new(4.0, 8.0, -4.0), true));
    scene.add_light(PointLight::new(Color::new(8.0, 8.0, 12.0), Vec3::new(-6.0, 3.0, -6.0), false));

    let ground: Arc<dyn Shader> = Arc::new(PhongShader::new(Color::splat(0.8), 0.4, 0.8, 0.0, 1.0));
    scene.add_primitive(Plane::new(ground, Vec3::ZERO, Vec3::Y));

    let textured: Arc<dyn Shader> = Arc::new(
        PhongShader::new(Color::new(0.9, 0.3, 0.2), 0.2, 0.7, 0.5, 40.0).with_texture(Arc::new(texture)),
    );
    scene.add_solid(Solid::sphere(textured, Vec3::new(-1.6, 1.0, 0.0), 1.0, 48, true));

    let faceted: Arc<dyn Shader> = Arc::new(PhongShader::new(Color::new(0.2, 0.5, 0.9), 0.2, 0.8, 0.3, 20.0));
    scene.add_solid(Solid::sphere(faceted, Vec3::new(1.6, 1.0, 0.5), 1.0, 12, false));

    let cone_shader: Arc<dyn Shader> = Arc::new(EyelightShader::new(Color::new(0.9, 0.8, 0.3)));
    let cone = scene.add_solid(Solid::cone(cone_shader, Vec3::new(0.0, 0.0, 2.5), 0.8, 2.0, 24, true));

    // Unlit backdrop card behind the set
    let card: Arc<dyn Shader> = Arc::new(FlatShader::new(Color::new(0.15, 0.15, 0.2)));
    scene.add_solid(Solid::quad(
        card,
        Vec3::new(-8.0, 0.0, 8.0),
        Vec3::new(8.0, 0.0, 8.0),
        Vec3::new(8.0, 6.0, 8.0),
        Vec3::new(-8.0, 6.0, 8.0),
    ));

    let config = RenderConfig::default()
        .with_samples(4, SampleStrategy::Stratified)
        .with_seed(7);
    let tilt = Transform::new().rotate(Vec3::Z, 10.0).matrix();

    for frame in 0..FRAMES {
        // Swing the camera through 90 degrees in front of the set
        let phase = (frame as f32 / (FRAMES - 1) as f32 - 0.5) * std::f32::consts::FRAC_PI_2;
        if let Some(camera) = scene.camera_mut(cam_index) {
            camera.set_position(Vec3::new(9.0 * phase.sin(), 3.0, -9.0 * phase.cos()))?;
        }
        // Key light drifts the opposite way to the camera
        if let Some(light) = scene.light_mut(key_light) {
            light.set_origin(Vec3::new(-4.0 * phase.sin() + 4.0, 8.0, -4.0));
        }
        if frame > 0 {
            scene.transform_solid(cone, &tilt)?;
        }
        scene.build_accel_structure(30, 3);

        let image = render(&scene, &config)?;
        let path = out_dir.join(format!("frame_{:03}.png", frame));
        image
            .to_image()
            .save(&path)
            .with_context(|| format!("saving {}", path.display()))?;
        log::info!("Saved {}", path.display());
    }

    Ok(())
}
