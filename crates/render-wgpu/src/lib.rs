//! wgpu render backend.
//!
//! Uploads [`facet_assets::MeshData`] and [`facet_assets::TextureData`] to
//! GPU buffers and draws scene objects with per-object projection and
//! model-view uniforms.
//!
//! # Invariants
//! - GPU resources are released by an explicit `destroy` call, never by a
//!   scene object going away.
//! - The renderer never mutates scene objects.

mod gpu;
mod mesh;
mod shaders;
mod texture;

pub use gpu::{GpuFrame, MeshRenderer};
pub use mesh::GpuMesh;
pub use texture::GpuTexture;

/// Errors from GPU resource creation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("shader error: {0}")]
    Shader(String),
    #[error("device error: {0}")]
    Device(String),
    #[error("mesh error: {0}")]
    Mesh(String),
    #[error(transparent)]
    Asset(#[from] facet_assets::AssetError),
}

pub fn crate_info() -> &'static str {
    "facet-render-wgpu v0.1.0"
}
