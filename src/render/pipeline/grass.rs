//! Instanced grass render pipeline.
//!
//! Draws the whole patch in one `draw_indexed` call: the shared blade
//! index buffer times `instance_count` instances. There is no vertex
//! buffer; grass.wgsl derives each vertex from its vertex and instance
//! indices plus the `GrassUniforms` for the frame.

use crate::grass::{BladeTopology, FieldNoise, GrassUniforms, InstanceSet};
use crate::render::buffer::CameraBuffer;
use crate::render::texture::DepthTexture;

/// Grass rendering pipeline and its GPU resources.
pub struct GrassPipeline {
    pipeline: wgpu::RenderPipeline,
    uniforms_buffer: wgpu::Buffer,
    #[allow(dead_code)]
    field_texture: wgpu::Texture,
    grass_bind_group: wgpu::BindGroup,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_count: u32,
}

impl GrassPipeline {
    /// Create the pipeline with an initial topology and instance set.
    ///
    /// # Arguments
    /// * `device`/`queue` - WGPU handles
    /// * `camera_buffer` - camera uniform (bind group 0)
    /// * `topology` - shared blade index topology
    /// * `instances` - instance count + bounding volume
    /// * `field` - baked field noise, uploaded once as a repeat texture
    /// * `surface_format` - swapchain color format
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera_buffer: &CameraBuffer,
        topology: &BladeTopology,
        instances: InstanceSet,
        field: &FieldNoise,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grass_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/grass.wgsl").into()),
        });

        let uniforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grass_uniforms"),
            size: std::mem::size_of::<GrassUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Field noise texture, wrap-repeated over the patch.
        let field_size = field.size();
        let field_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("grass_field_noise"),
            size: wgpu::Extent3d {
                width: field_size,
                height: field_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &field_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &field.texel_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(field_size * 4),
                rows_per_image: Some(field_size),
            },
            wgpu::Extent3d {
                width: field_size,
                height: field_size,
                depth_or_array_layers: 1,
            },
        );
        let field_view = field_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let field_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("grass_field_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let grass_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("grass_bind_group_layout"),
                entries: &[
                    // Grass uniforms
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // Field noise texture
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Field noise sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let grass_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass_bind_group"),
            layout: &grass_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&field_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&field_sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grass_pipeline_layout"),
            bind_group_layouts: &[camera_buffer.bind_group_layout(), &grass_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grass_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - everything is procedural
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTexture::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let (index_buffer, index_count) = Self::create_index_buffer(device, topology);

        Self {
            pipeline,
            uniforms_buffer,
            field_texture,
            grass_bind_group,
            index_buffer,
            index_count,
            instance_count: instances.count,
        }
    }

    fn create_index_buffer(
        device: &wgpu::Device,
        topology: &BladeTopology,
    ) -> (wgpu::Buffer, u32) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grass_index_buffer"),
            size: topology.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
            mapped_at_creation: true,
        });
        buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytemuck::cast_slice(&topology.indices));
        buffer.unmap();
        (buffer, topology.indices.len() as u32)
    }

    /// Swap in freshly generated topology and instance count.
    ///
    /// The previous index buffer is only released after the swap, and
    /// wgpu keeps it alive until in-flight frames finish, so a rebuild
    /// never produces an empty draw.
    pub fn rebuild(&mut self, device: &wgpu::Device, topology: &BladeTopology, instances: InstanceSet) {
        let (buffer, count) = Self::create_index_buffer(device, topology);
        self.index_buffer = buffer;
        self.index_count = count;
        self.instance_count = instances.count;
    }

    /// Upload this frame's uniforms.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &GrassUniforms) {
        queue.write_buffer(&self.uniforms_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Current instance count.
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Draw all blades. Color and depth are loaded, not cleared; the
    /// ground pass runs first and clears both.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("grass_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.grass_bind_group, &[]);
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }
}
