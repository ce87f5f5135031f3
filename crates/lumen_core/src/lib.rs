//! Lumen Core - renderer-agnostic geometry and texture assets.
//!
//! This crate provides:
//!
//! - **Meshes**: indexed triangle lists with optional per-vertex normals and
//!   UVs, plus tessellation generators (UV sphere, cone, quad)
//! - **Textures**: decoded linear RGB pixel grids with UV lookup
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Mesh, Texture};
//!
//! let globe = Mesh::uv_sphere(Vec3::ZERO, 5.0, 32, true);
//! let earth = Texture::open("earth.jpg").unwrap_or_else(|_| Texture::empty());
//! ```

pub mod mesh;
pub mod texture;

// Re-export commonly used types
pub use mesh::Mesh;
pub use texture::{Texture, TextureError, TextureResult};
