use crate::RenderError;
use crate::mesh::GpuMesh;
use crate::shaders;
use crate::texture::GpuTexture;
use bytemuck::{Pod, Zeroable};
use facet_assets::TextureData;
use facet_common::SceneObject;
use facet_render::{RenderView, Renderer, Transformation};
use glam::Mat4;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.08,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObjectUniforms {
    projection: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
    color: [f32; 4],
    flags: [u32; 4],
}

impl ObjectUniforms {
    fn new(projection: &Mat4, model_view: &Mat4, mesh: &GpuMesh) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            model_view: model_view.to_cols_array_2d(),
            color: mesh.color(),
            flags: [u32::from(mesh.uses_texture()), 0, 0, 0],
        }
    }
}

/// Round `size` up to a multiple of `alignment` (a power of two).
fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Draws scene objects with one set of uniforms per object, addressed by
/// dynamic offset into a shared buffer.
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    capacity: usize,
    fallback_texture: GpuTexture,
    depth_texture: wgpu::TextureView,
    depth_size: (u32, u32),
    transformation: Transformation,
}

impl MeshRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let uniform_size = std::mem::size_of::<ObjectUniforms>() as u64;
        let uniform_stride = aligned_stride(
            uniform_size,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: 3 * 4,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 2 * 4,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x2],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 3 * 4,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![2 => Float32x3],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            tracing::error!(error = %err, "mesh pipeline rejected");
            return Err(RenderError::Shader(err.to_string()));
        }

        let capacity = 64;
        let (uniform_buffer, uniform_bind_group) =
            Self::create_uniforms(device, &uniform_layout, uniform_stride, capacity);

        let white = TextureData {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        };
        let fallback_texture = GpuTexture::upload(device, queue, &texture_layout, &white);
        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(uniform_stride, capacity, "mesh renderer ready");
        Ok(Self {
            pipeline,
            uniform_layout,
            texture_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            capacity,
            fallback_texture,
            depth_texture,
            depth_size: (width, height),
            transformation: Transformation::default(),
        })
    }

    /// Layout a [`GpuTexture`] must be uploaded with to be drawable here.
    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn set_transformation(&mut self, transformation: Transformation) {
        self.transformation = transformation;
    }

    /// Record a pass that clears `target` and draws every object.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        objects: &[SceneObject<GpuMesh>],
        view: &RenderView,
    ) {
        let size = (view.width.max(1), view.height.max(1));
        if size != self.depth_size {
            self.depth_texture = Self::create_depth_texture(device, size.0, size.1);
            self.depth_size = size;
        }
        self.ensure_capacity(device, objects.len());

        let projection = self.transformation.projection(view.width, view.height);
        let view_matrix = self.transformation.view(&view.camera);
        let stride = self.uniform_stride as usize;
        let mut staging = vec![0u8; stride * objects.len()];
        for (i, object) in objects.iter().enumerate() {
            let model_view = self.transformation.model_view(&object.transform, &view_matrix);
            let uniforms = ObjectUniforms::new(&projection, &model_view, object.mesh());
            let bytes = bytemuck::bytes_of(&uniforms);
            staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        if !staging.is_empty() {
            queue.write_buffer(&self.uniform_buffer, 0, &staging);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("mesh_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        for (i, object) in objects.iter().enumerate() {
            let mesh = object.mesh();
            let offset = (i * stride) as u32;
            pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
            let texture = match mesh.texture() {
                Some(t) if mesh.uses_texture() => t.bind_group(),
                _ => self.fallback_texture.bind_group(),
            };
            pass.set_bind_group(1, texture, &[]);
            mesh.bind(&mut pass);
            pass.draw_indexed(0..mesh.vertex_count(), 0, 0..1);
        }
        tracing::trace!(objects = objects.len(), "mesh pass recorded");
    }

    /// Borrow this renderer as a [`Renderer`] bound to one frame's target.
    pub fn frame<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target: &'a wgpu::TextureView,
    ) -> GpuFrame<'a> {
        GpuFrame {
            renderer: self,
            device,
            queue,
            target,
        }
    }

    /// Free the renderer's own GPU memory.
    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.fallback_texture.destroy();
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, objects: usize) {
        if objects <= self.capacity {
            return;
        }
        let capacity = objects.next_power_of_two();
        self.uniform_buffer.destroy();
        let (buffer, bind_group) =
            Self::create_uniforms(device, &self.uniform_layout, self.uniform_stride, capacity);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.capacity = capacity;
        tracing::debug!(capacity, "grew object uniform buffer");
    }

    fn create_uniforms(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_uniform_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// One frame's GPU context, usable through the [`Renderer`] trait.
pub struct GpuFrame<'a> {
    renderer: &'a mut MeshRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    target: &'a wgpu::TextureView,
}

impl Renderer<GpuMesh> for GpuFrame<'_> {
    type Output = wgpu::CommandBuffer;

    fn draw(&mut self, objects: &[SceneObject<GpuMesh>], view: &RenderView) -> wgpu::CommandBuffer {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mesh_encoder"),
            });
        self.renderer
            .draw(self.device, self.queue, &mut encoder, self.target, objects, view);
        encoder.finish()
    }
}
