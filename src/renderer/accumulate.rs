//! Progressive accumulation compute pass
//!
//! Each dispatch traces one jittered sample per pixel and folds it into the
//! running average. The pass reads last frame's average from the history
//! texture (`TextureIndex::Input`) and writes the updated average to the
//! accumulation target (`TextureIndex::Output`); the renderer swaps the two
//! textures between frames.

use glam::UVec2;

use crate::shader_types::{BufferIndex, TextureIndex};

/// Kernel threadgroup edge length
pub const WORKGROUP_SIZE: u32 = 16;

pub struct AccumulatePass {
    pipeline: wgpu::ComputePipeline,
    environment_group: wgpu::BindGroup,
    texture_groups: [wgpu::BindGroup; 2],
    target_size: UVec2,
}

impl AccumulatePass {
    pub fn new(
        device: &wgpu::Device,
        environment_buffer: &wgpu::Buffer,
        accumulation_views: &[wgpu::TextureView; 2],
        target_size: UVec2,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("accumulate_shader"),
            source: wgpu::ShaderSource::Wgsl(ACCUMULATE_SHADER.into()),
        });

        let buffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("accumulate_buffers"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: BufferIndex::Environment as u32,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("accumulate_textures"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: TextureIndex::Input as u32,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: TextureIndex::Output as u32,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&buffer_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("accumulate_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        let environment_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("accumulate_environment"),
            layout: &buffer_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: BufferIndex::Environment as u32,
                resource: environment_buffer.as_entire_binding(),
            }],
        });

        // One group per accumulation target; history is always the other texture
        let texture_group = |target: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("accumulate_target"),
                layout: &texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: TextureIndex::Input as u32,
                        resource: wgpu::BindingResource::TextureView(
                            &accumulation_views[1 - target],
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: TextureIndex::Output as u32,
                        resource: wgpu::BindingResource::TextureView(&accumulation_views[target]),
                    },
                ],
            })
        };

        Self {
            pipeline,
            environment_group,
            texture_groups: [texture_group(0), texture_group(1)],
            target_size,
        }
    }

    /// Encode one accumulation dispatch writing into `target`
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: usize) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("accumulate_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.environment_group, &[]);
        pass.set_bind_group(1, &self.texture_groups[target], &[]);

        let groups_x = (self.target_size.x + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
        let groups_y = (self.target_size.y + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
        pass.dispatch_workgroups(groups_x, groups_y, 1);
    }
}

pub const ACCUMULATE_SHADER: &str = r#"
struct Environment {
    nframe: f32,
    timestamp: f32,
    camera_position: vec3<f32>,
    camera_direction: vec2<f32>,
}

@group(0) @binding(2) var<uniform> environment: Environment;
@group(1) @binding(0) var history: texture_2d<f32>;
@group(1) @binding(1) var accumulation: texture_storage_2d<rgba8unorm, write>;

const FIELD_OF_VIEW: f32 = 0.9;
const EPSILON: f32 = 1e-3;
const MISS: f32 = 1e30;
const TAU: f32 = 6.28318530718;

fn pcg(value: u32) -> u32 {
    let state = value * 747796405u + 2891336453u;
    let word = ((state >> ((state >> 28u) + 4u)) ^ state) * 277803737u;
    return (word >> 22u) ^ word;
}

fn next_random(seed: ptr<function, u32>) -> f32 {
    *seed = pcg(*seed);
    return f32(*seed) / 4294967296.0;
}

struct Hit {
    t: f32,
    normal: vec3<f32>,
    albedo: vec3<f32>,
    emission: vec3<f32>,
    mirror: bool,
}

fn sphere_t(origin: vec3<f32>, dir: vec3<f32>, center: vec3<f32>, radius: f32) -> f32 {
    let oc = origin - center;
    let b = dot(oc, dir);
    let c = dot(oc, oc) - radius * radius;
    let disc = b * b - c;
    if (disc < 0.0) {
        return MISS;
    }
    let sq = sqrt(disc);
    var t = -b - sq;
    if (t < EPSILON) {
        t = -b + sq;
    }
    if (t < EPSILON) {
        return MISS;
    }
    return t;
}

fn consider_sphere(hit: ptr<function, Hit>, origin: vec3<f32>, dir: vec3<f32>,
                   center: vec3<f32>, radius: f32,
                   albedo: vec3<f32>, emission: vec3<f32>, mirror: bool) {
    let t = sphere_t(origin, dir, center, radius);
    if (t < (*hit).t) {
        (*hit).t = t;
        (*hit).normal = normalize(origin + t * dir - center);
        (*hit).albedo = albedo;
        (*hit).emission = emission;
        (*hit).mirror = mirror;
    }
}

fn intersect_scene(origin: vec3<f32>, dir: vec3<f32>) -> Hit {
    var hit: Hit;
    hit.t = MISS;
    hit.mirror = false;

    // checkerboard ground plane at y = 0
    if (abs(dir.y) > 1e-6) {
        let t = -origin.y / dir.y;
        if (t > EPSILON && t < hit.t) {
            hit.t = t;
            hit.normal = vec3<f32>(0.0, 1.0, 0.0);
            let p = origin + t * dir;
            let checker = f32((i32(floor(p.x / 20.0)) + i32(floor(p.z / 20.0))) & 1);
            hit.albedo = mix(vec3<f32>(0.25), vec3<f32>(0.75), checker);
            hit.emission = vec3<f32>(0.0);
            hit.mirror = false;
        }
    }

    consider_sphere(&hit, origin, dir, vec3<f32>(27.0, 16.5, 47.0), 16.5,
                    vec3<f32>(0.95, 0.95, 0.95), vec3<f32>(0.0), true);
    consider_sphere(&hit, origin, dir, vec3<f32>(73.0, 16.5, 78.0), 16.5,
                    vec3<f32>(0.75, 0.25, 0.25), vec3<f32>(0.0), false);
    consider_sphere(&hit, origin, dir, vec3<f32>(50.0, 90.0, 30.0), 15.0,
                    vec3<f32>(0.0), vec3<f32>(10.0, 9.0, 8.0), false);

    return hit;
}

fn sky(dir: vec3<f32>) -> vec3<f32> {
    let t = 0.5 * (dir.y + 1.0);
    return mix(vec3<f32>(0.08, 0.09, 0.12), vec3<f32>(0.35, 0.45, 0.65), t);
}

fn cosine_hemisphere(normal: vec3<f32>, seed: ptr<function, u32>) -> vec3<f32> {
    let u1 = next_random(seed);
    let u2 = next_random(seed);
    let r = sqrt(u1);
    let phi = TAU * u2;
    var tangent = vec3<f32>(1.0, 0.0, 0.0);
    if (abs(normal.y) < 0.99) {
        tangent = normalize(cross(normal, vec3<f32>(0.0, 1.0, 0.0)));
    }
    let bitangent = cross(normal, tangent);
    let z = sqrt(max(0.0, 1.0 - u1));
    return normalize(r * cos(phi) * tangent + r * sin(phi) * bitangent + z * normal);
}

fn camera_ray(pixel: vec2<f32>, size: vec2<f32>) -> vec3<f32> {
    let ndc = pixel / size * 2.0 - 1.0;
    let aspect = size.x / size.y;
    let scale = tan(0.5 * FIELD_OF_VIEW);
    var dir = normalize(vec3<f32>(ndc.x * aspect * scale, -ndc.y * scale, -1.0));

    let pitch = environment.camera_direction.y;
    let cp = cos(pitch);
    let sp = sin(pitch);
    dir = vec3<f32>(dir.x, dir.y * cp - dir.z * sp, dir.y * sp + dir.z * cp);

    let yaw = environment.camera_direction.x;
    let cy = cos(yaw);
    let sy = sin(yaw);
    return vec3<f32>(dir.x * cy - dir.z * sy, dir.y, dir.x * sy + dir.z * cy);
}

fn trace(first_dir: vec3<f32>, seed: ptr<function, u32>) -> vec3<f32> {
    var origin = environment.camera_position;
    var dir = first_dir;
    var throughput = vec3<f32>(1.0);
    var radiance = vec3<f32>(0.0);

    for (var bounce = 0; bounce < 4; bounce++) {
        let hit = intersect_scene(origin, dir);
        if (hit.t >= MISS) {
            radiance += throughput * sky(dir);
            break;
        }
        radiance += throughput * hit.emission;
        let point = origin + hit.t * dir;
        if (hit.mirror) {
            dir = reflect(dir, hit.normal);
        } else {
            throughput *= hit.albedo;
            dir = cosine_hemisphere(hit.normal, seed);
        }
        origin = point + EPSILON * hit.normal;
    }

    return radiance;
}

@compute @workgroup_size(16, 16, 1)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let size = textureDimensions(accumulation);
    if (gid.x >= size.x || gid.y >= size.y) {
        return;
    }

    var seed = pcg(gid.x + size.x * (gid.y + size.y * u32(environment.nframe)));
    let jitter = vec2<f32>(next_random(&seed), next_random(&seed));
    let dir = camera_ray(vec2<f32>(gid.xy) + jitter, vec2<f32>(size));
    let fresh = trace(dir, &seed);

    let n = max(environment.nframe, 1.0);
    var color = fresh;
    if (n > 1.0) {
        let prev = textureLoad(history, vec2<i32>(gid.xy), 0).rgb;
        color = prev + (fresh - prev) / n;
    }
    textureStore(accumulation, vec2<i32>(gid.xy), vec4<f32>(color, 1.0));
}
"#;
