//! Present pass: draw the accumulated image on the viewport quad
//!
//! The vertex shader maps the quad's pixel-space positions into clip space
//! using the viewport-size uniform; the fragment shader samples whichever
//! accumulation texture the kernel wrote this frame.

use crate::shader_types::{BufferIndex, TextureIndex, Vertex, VertexAttribute};

use crate::resources::Quad;

pub struct PresentPass {
    pipeline: wgpu::RenderPipeline,
    viewport_group: wgpu::BindGroup,
    texture_groups: [wgpu::BindGroup; 2],
}

impl PresentPass {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        viewport_buffer: &wgpu::Buffer,
        accumulation_views: &[wgpu::TextureView; 2],
        sampler: &wgpu::Sampler,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("present_shader"),
            source: wgpu::ShaderSource::Wgsl(PRESENT_SHADER.into()),
        });

        let buffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("present_buffers"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: BufferIndex::ViewportSize as u32,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("present_textures"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: TextureIndex::Output as u32,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&buffer_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("present_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: VertexAttribute::Position as u32,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: std::mem::size_of::<glam::Vec2>() as wgpu::BufferAddress,
                            shader_location: VertexAttribute::Texcoord as u32,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let viewport_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("present_viewport"),
            layout: &buffer_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: BufferIndex::ViewportSize as u32,
                resource: viewport_buffer.as_entire_binding(),
            }],
        });

        let texture_group = |target: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("present_source"),
                layout: &texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: TextureIndex::Output as u32,
                        resource: wgpu::BindingResource::TextureView(&accumulation_views[target]),
                    },
                    wgpu::BindGroupEntry {
                        binding: SAMPLER_BINDING,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        };

        Self {
            pipeline,
            viewport_group,
            texture_groups: [texture_group(0), texture_group(1)],
        }
    }

    /// Encode the quad draw sampling the accumulation texture written this
    /// frame
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        vertex_buffer: &wgpu::Buffer,
        source: usize,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("present_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.viewport_group, &[]);
        pass.set_bind_group(1, &self.texture_groups[source], &[]);
        pass.set_vertex_buffer(BufferIndex::Vertices as u32, vertex_buffer.slice(..));
        pass.draw(0..Quad::VERTEX_COUNT, 0..1);
    }
}

/// Sampler slot; sits after the schema's texture slots in the texture group
const SAMPLER_BINDING: u32 = 2;

pub const PRESENT_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) tex_coord: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
}

@group(0) @binding(1) var<uniform> viewport_size: vec2<u32>;
@group(1) @binding(1) var accumulated: texture_2d<f32>;
@group(1) @binding(2) var accumulated_sampler: sampler;

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    let half_size = vec2<f32>(viewport_size) / 2.0;
    var output: VertexOutput;
    output.clip_position = vec4<f32>(input.position / half_size, 0.0, 1.0);
    output.tex_coord = input.tex_coord;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(accumulated, accumulated_sampler, input.tex_coord);
}
"#;
