//! Lumen renderer - CPU Whitted-style ray tracing
//!
//! Casts one or more primary rays per pixel from the active camera, finds
//! the closest hit through a BVH, and shades it with flat, eyelight or
//! Phong shaders using point lights and hard shadows.
//!
//! ```ignore
//! let mut scene = Scene::new(Color::ZERO);
//! scene.add_camera(PerspectiveCamera::new(res, pos, dir, Vec3::Y, 60.0)?);
//! scene.add_light(PointLight::new(Color::splat(100.0), light_pos, true));
//! scene.add_solid(Solid::sphere(shader, Vec3::ZERO, 1.0, 32, true));
//! scene.build_accel_structure(30, 3);
//! let image = render(&scene, &RenderConfig::default())?;
//! ```

mod bvh;
mod camera;
mod light;
mod plane;
mod primitive;
mod ray;
mod renderer;
mod sampler;
mod scene;
mod shader;
mod solid;
mod sphere;
mod triangle;

pub use bvh::{AccelConfig, Bvh, BvhStats};
pub use camera::{
    Camera, CameraError, CameraResult, PerspectiveCamera, Resolution, TargetCamera, PIXEL_CENTER,
};
pub use light::{Light, PointLight};
pub use plane::Plane;
pub use primitive::{Intersection, PrimId, Primitive};
pub use ray::Ray;
pub use renderer::{
    clamp_01, color_to_rgb8, render, render_pixel, ImageBuffer, RenderConfig, RenderError,
    RenderResult,
};
pub use sampler::{SampleStrategy, Sampler};
pub use scene::{Scene, SceneError, SceneResult, SolidId};
pub use shader::{Color, EyelightShader, FlatShader, HitRecord, PhongShader, Shader};
pub use solid::{about_pivot, Solid};
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Mat4, Transform, Vec2, Vec3};
