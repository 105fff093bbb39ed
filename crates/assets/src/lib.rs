//! Asset pipeline: OBJ import, texture decoding and a content-addressed
//! registry.
//!
//! Assets are identified by a hash of their content, so importing the same
//! data twice yields one entry. Renderers consume [`MeshData`] and
//! [`TextureData`] and upload them themselves.
//!
//! # Invariants
//! - A [`MeshData`] held by the store has passed [`MeshData::validate`].
//! - A malformed import fails that import only; the store is unchanged.

pub mod mesh;
pub mod obj;
pub mod texture;

pub use mesh::MeshData;
pub use obj::{Face, IndexGroup, ObjDocument, SeamConflict, load_obj, load_obj_str, parse_obj};
pub use texture::TextureData;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Content-addressed asset ID: the first 8 bytes of the SHA-256 of the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// An asset entry in the registry.
#[derive(Debug, Clone)]
pub enum Asset {
    Mesh(MeshData),
    Texture(TextureData),
}

/// Content-addressed asset registry.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and return its asset ID.
    pub fn register_mesh(&mut self, mesh: MeshData) -> Result<AssetId, AssetError> {
        mesh.validate()?;
        let id = content_id(b"mesh", &mesh.content_bytes());
        self.assets.entry(id).or_insert(Asset::Mesh(mesh));
        Ok(id)
    }

    /// Register a texture and return its asset ID.
    pub fn register_texture(&mut self, texture: TextureData) -> AssetId {
        let mut bytes = Vec::with_capacity(texture.rgba.len() + 8);
        bytes.extend_from_slice(&texture.width.to_le_bytes());
        bytes.extend_from_slice(&texture.height.to_le_bytes());
        bytes.extend_from_slice(&texture.rgba);
        let id = content_id(b"texture", &bytes);
        self.assets.entry(id).or_insert(Asset::Texture(texture));
        id
    }

    /// Import an OBJ file.
    pub fn import_obj(&mut self, path: impl AsRef<Path>) -> Result<AssetId, AssetError> {
        let mesh = load_obj(path.as_ref())?;
        let id = self.register_mesh(mesh)?;
        tracing::debug!(path = %path.as_ref().display(), %id, "registered mesh");
        Ok(id)
    }

    /// Import a PNG or JPEG file.
    pub fn import_texture(&mut self, path: impl AsRef<Path>) -> Result<AssetId, AssetError> {
        let texture = TextureData::load(path.as_ref())?;
        let id = self.register_texture(texture);
        tracing::debug!(path = %path.as_ref().display(), %id, "registered texture");
        Ok(id)
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn get_mesh(&self, id: AssetId) -> Option<&MeshData> {
        match self.assets.get(&id) {
            Some(Asset::Mesh(m)) => Some(m),
            _ => None,
        }
    }

    pub fn get_texture(&self, id: AssetId) -> Option<&TextureData> {
        match self.assets.get(&id) {
            Some(Asset::Texture(t)) => Some(t),
            _ => None,
        }
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

fn content_id(kind: &[u8], data: &[u8]) -> AssetId {
    let mut hasher = Sha256::new();
    hasher.update(kind);
    hasher.update(data);
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}

pub fn crate_info() -> &'static str {
    "facet-assets v0.1.0"
}
