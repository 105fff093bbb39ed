use crate::AssetError;
use serde::{Deserialize, Serialize};

/// CPU-side triangle mesh with parallel attribute arrays.
///
/// Slot `i` of `positions` (3 floats), `texcoords` (2 floats) and `normals`
/// (3 floats) describes the same vertex. `texcoords` and `normals` may be
/// empty when the mesh has no such attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a mesh, checking array lengths and index bounds.
    pub fn new(
        positions: Vec<f32>,
        texcoords: Vec<f32>,
        normals: Vec<f32>,
        indices: Vec<u32>,
    ) -> Result<Self, AssetError> {
        let mesh = Self {
            positions,
            texcoords,
            normals,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Number of attribute slots.
    pub fn position_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Vertices drawn: one per index.
    pub fn vertex_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if self.positions.len() % 3 != 0 {
            return Err(AssetError::InvalidMesh(format!(
                "position array length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        let slots = self.position_count();
        if self.has_texcoords() && self.texcoords.len() != slots * 2 {
            return Err(AssetError::InvalidMesh(format!(
                "{} texcoord floats for {slots} positions",
                self.texcoords.len()
            )));
        }
        if self.has_normals() && self.normals.len() != slots * 3 {
            return Err(AssetError::InvalidMesh(format!(
                "{} normal floats for {slots} positions",
                self.normals.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(AssetError::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= slots) {
            return Err(AssetError::InvalidMesh(format!(
                "index {bad} out of range for {slots} positions"
            )));
        }
        Ok(())
    }

    /// Little-endian bytes of every array, used for content addressing.
    pub(crate) fn content_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            (self.positions.len() + self.texcoords.len() + self.normals.len()) * 4
                + self.indices.len() * 4
                + 32,
        );
        for array in [&self.positions, &self.texcoords, &self.normals] {
            out.extend_from_slice(&(array.len() as u64).to_le_bytes());
            for v in array.iter() {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out.extend_from_slice(&(self.indices.len() as u64).to_le_bytes());
        for i in &self.indices {
            out.extend_from_slice(&i.to_le_bytes());
        }
        out
    }

    /// Unit quad in the XY plane at z = 1 with texture coordinates and no normals.
    pub fn textured_quad() -> Self {
        Self {
            positions: vec![
                -1.0, 1.0, 1.0, //
                -1.0, -1.0, 1.0, //
                1.0, -1.0, 1.0, //
                1.0, 1.0, 1.0,
            ],
            texcoords: vec![
                1.0, 1.0, //
                1.0, 0.0, //
                0.0, 0.0, //
                0.0, 1.0,
            ],
            normals: Vec::new(),
            indices: vec![0, 1, 3, 3, 1, 2],
        }
    }
}
