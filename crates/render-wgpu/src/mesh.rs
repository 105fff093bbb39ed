use crate::RenderError;
use crate::texture::GpuTexture;
use facet_assets::MeshData;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Mesh resident in GPU memory: one vertex buffer per attribute plus an
/// index buffer.
///
/// Meshes without texcoords or normals get zero-filled buffers, so every
/// mesh binds the same vertex layout.
#[derive(Debug)]
pub struct GpuMesh {
    positions: wgpu::Buffer,
    texcoords: wgpu::Buffer,
    normals: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    texture: Option<Arc<GpuTexture>>,
    use_texture: bool,
    color: [f32; 4],
}

/// `values`, or zeros for `slots` vertices of `width` floats when empty.
pub(crate) fn attribute_or_zeroed(values: &[f32], slots: usize, width: usize) -> Vec<f32> {
    if values.is_empty() {
        vec![0.0; slots * width]
    } else {
        values.to_vec()
    }
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &MeshData) -> Result<Self, RenderError> {
        mesh.validate()?;
        if mesh.indices.is_empty() {
            return Err(RenderError::Mesh("mesh has no indices".into()));
        }
        let index_count = u32::try_from(mesh.indices.len())
            .map_err(|_| RenderError::Mesh("too many indices".into()))?;
        let slots = mesh.position_count();

        let vertex_buffer = |label: &str, data: &[f32]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };
        let positions = vertex_buffer("mesh_positions", &mesh.positions);
        let texcoords = vertex_buffer(
            "mesh_texcoords",
            &attribute_or_zeroed(&mesh.texcoords, slots, 2),
        );
        let normals = vertex_buffer(
            "mesh_normals",
            &attribute_or_zeroed(&mesh.normals, slots, 3),
        );
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(slots, index_count, "uploaded mesh");

        Ok(Self {
            positions,
            texcoords,
            normals,
            indices,
            index_count,
            texture: None,
            use_texture: false,
            color: [1.0, 1.0, 1.0, 1.0],
        })
    }

    /// Sample `texture` instead of the flat color.
    pub fn with_texture(mut self, texture: Arc<GpuTexture>) -> Self {
        self.texture = Some(texture);
        self.use_texture = true;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn set_use_texture(&mut self, use_texture: bool) {
        self.use_texture = use_texture;
    }

    pub fn texture(&self) -> Option<&Arc<GpuTexture>> {
        self.texture.as_ref()
    }

    pub fn uses_texture(&self) -> bool {
        self.use_texture && self.texture.is_some()
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn vertex_count(&self) -> u32 {
        self.index_count
    }

    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.texcoords.slice(..));
        pass.set_vertex_buffer(2, self.normals.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Free the buffers. The bound texture is shared and left alone.
    pub fn destroy(&self) {
        self.positions.destroy();
        self.texcoords.destroy();
        self.normals.destroy();
        self.indices.destroy();
    }
}
