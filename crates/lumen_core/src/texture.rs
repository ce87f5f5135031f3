//! Textures for shaders.
//!
//! A texture is a decoded RGB pixel grid looked up with UV coordinates in
//! `[0, 1] x [0, 1]`. Decoding files is left to the `image` crate; this
//! module only converts its buffers.

use std::path::Path;

use lumen_math::{Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur while building a texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Texture size mismatch: {width}x{height} needs {expected} pixels, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A texture with pixel data.
///
/// Pixels are linear RGB in `[0, 1]`, row-major, row 0 at the top. UV
/// `(0, 0)` maps to the top-left pixel and `(1, 1)` to the bottom-right.
#[derive(Clone, Debug, Default)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>) -> TextureResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A texture with no pixels. Shaders fall back to their flat color.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
        }
    }

    /// Convert a decoded image. Channel bytes are scaled to `[0, 1]`.
    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32) / 255.0)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an image file with the `image` crate.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?;
        let texture = Self::from_image(&img);
        log::debug!(
            "Loaded texture: {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True if the texture holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Sample the texture at `uv` with bilinear filtering.
    ///
    /// Coordinates wrap around outside `[0, 1]`. Returns `None` for an
    /// empty texture.
    pub fn sample(&self, uv: Vec2) -> Option<Vec3> {
        if self.is_empty() {
            return None;
        }

        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);

        // Convert to pixel coordinates
        let x = u * (self.width - 1) as f32;
        let y = v * (self.height - 1) as f32;

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let top = self.texel(x0, y0).lerp(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), fx);
        Some(top.lerp(bottom, fy))
    }

    fn texel(&self, x: u32, y: u32) -> Vec3 {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // 2x2: black, white / white, black
        Texture::new(2, 2, vec![Vec3::ZERO, Vec3::ONE, Vec3::ONE, Vec3::ZERO]).unwrap()
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.width(), 1);
        assert_eq!(tex.height(), 1);

        let sample = tex.sample(Vec2::new(0.5, 0.5)).unwrap();
        assert!((sample - Vec3::new(1.0, 0.5, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_empty_texture_samples_nothing() {
        let tex = Texture::empty();
        assert!(tex.is_empty());
        assert!(tex.sample(Vec2::new(0.3, 0.7)).is_none());
    }

    #[test]
    fn test_size_mismatch() {
        let err = Texture::new(2, 2, vec![Vec3::ONE; 3]).unwrap_err();
        assert!(matches!(err, TextureError::SizeMismatch { expected: 4, actual: 3, .. }));
    }

    #[test]
    fn test_corners_and_bilinear_blend() {
        let tex = checker();
        assert_eq!(tex.sample(Vec2::new(0.0, 0.0)).unwrap(), Vec3::ZERO);
        assert_eq!(tex.sample(Vec2::new(0.999_999, 0.0)).unwrap().x.round(), 1.0);

        // Center blends all four texels equally
        let mid = tex.sample(Vec2::new(0.5, 0.5)).unwrap();
        assert!((mid - Vec3::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_uv_wraps() {
        let tex = checker();
        let a = tex.sample(Vec2::new(0.25, 0.25)).unwrap();
        let b = tex.sample(Vec2::new(1.25, -0.75)).unwrap();
        assert!((a - b).length() < 1e-5);
    }

    #[test]
    fn test_from_image() {
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 0, 255]));
        let tex = Texture::from_image(&image::DynamicImage::ImageRgb8(img));

        assert_eq!(tex.width(), 2);
        assert_eq!(tex.height(), 1);
        assert_eq!(tex.sample(Vec2::ZERO).unwrap(), Vec3::X);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(Texture::open("definitely/not/here.png").is_err());
    }
}
