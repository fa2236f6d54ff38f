//! Progressive renderer
//!
//! Owns the GPU context, the shared-schema resources (environment uniform,
//! viewport uniform, quad vertex buffer, accumulation texture pair) and the
//! two passes. Per frame it integrates the camera, refreshes the
//! environment, runs one accumulation dispatch and presents the result on
//! the viewport quad.

mod accumulate;
mod context;
mod present;

pub use accumulate::{AccumulatePass, ACCUMULATE_SHADER, WORKGROUP_SIZE};
pub use context::GpuContext;
pub use present::{PresentPass, PRESENT_SHADER};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use glam::UVec2;
use thiserror::Error;
use winit::window::Window as WinitWindow;

use crate::resources::Quad;
use crate::scene::Camera;
use crate::shader_types::{Environment, Vertex};
use crate::stats::FrameStats;
use crate::RendererConfig;

/// Renderer error type
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Failed to initialize renderer: {0}")]
    InitializationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Failed to read back the accumulated image: {0}")]
    ReadbackFailed(String),
    #[error("Failed to write image file: {0}")]
    ImageWriteFailed(String),
}

pub type RendererResult<T> = Result<T, RendererError>;

/// Compute the aligned bytes per row for a texture copy (wgpu requires
/// 256-byte alignment)
fn aligned_bytes_per_row(width: u32, bytes_per_pixel: u32) -> u32 {
    let unpadded = width * bytes_per_pixel;
    (unpadded + 255) & !255
}

pub struct Renderer {
    context: GpuContext,
    camera: Camera,

    environment_buffer: wgpu::Buffer,
    viewport_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    accumulation_textures: [wgpu::Texture; 2],
    accumulation_size: UVec2,

    accumulate_pass: AccumulatePass,
    present_pass: PresentPass,

    /// Accumulation texture written by the next frame
    target: usize,
    nframe: f32,
    start: Instant,
    stats: FrameStats,

    viewport: UVec2,
    viewport_dirty: bool,
}

impl Renderer {
    pub fn new(window: Arc<WinitWindow>, config: &RendererConfig) -> RendererResult<Self> {
        let context = GpuContext::new(window, config.vsync)?;
        let device = &context.device;

        let environment_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("environment_buffer"),
            size: std::mem::size_of::<Environment>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("viewport_buffer"),
            size: std::mem::size_of::<UVec2>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad_vertex_buffer"),
            size: (Quad::VERTEX_COUNT as usize * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let accumulation_size = UVec2::splat(config.accumulation_size);
        let accumulation_texture = |label| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: accumulation_size.x,
                    height: accumulation_size.y,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::STORAGE_BINDING
                    | wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        };
        let accumulation_textures = [
            accumulation_texture("accumulation_texture_0"),
            accumulation_texture("accumulation_texture_1"),
        ];
        let accumulation_views = [
            accumulation_textures[0].create_view(&wgpu::TextureViewDescriptor::default()),
            accumulation_textures[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("accumulation_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let accumulate_pass = AccumulatePass::new(
            device,
            &environment_buffer,
            &accumulation_views,
            accumulation_size,
        );
        let present_pass = PresentPass::new(
            device,
            context.surface_format(),
            &viewport_buffer,
            &accumulation_views,
            &sampler,
        );

        let (width, height) = context.surface_size();
        let renderer = Self {
            context,
            camera: Camera::new(),
            environment_buffer,
            viewport_buffer,
            vertex_buffer,
            accumulation_textures,
            accumulation_size,
            accumulate_pass,
            present_pass,
            target: 0,
            nframe: 0.0,
            start: Instant::now(),
            stats: FrameStats::new(),
            viewport: UVec2::new(width, height),
            viewport_dirty: false,
        };
        renderer.upload_viewport();
        Ok(renderer)
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Discard the accumulated image; the next frame starts a fresh average
    pub fn reset_accumulation(&mut self) {
        self.nframe = 0.0;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        let (width, height) = self.context.surface_size();
        self.viewport = UVec2::new(width, height);
        self.viewport_dirty = true;
    }

    /// Render one frame: accumulate one sample per pixel, then present
    pub fn draw(&mut self) -> RendererResult<()> {
        self.camera.advance();
        if self.camera.take_moved() {
            self.nframe = 0.0;
        }
        self.nframe += 1.0;

        let environment = Environment::new(
            self.nframe,
            self.start.elapsed().as_secs_f32(),
            self.camera.position,
            self.camera.direction,
        );
        self.context
            .queue
            .write_buffer(&self.environment_buffer, 0, bytemuck::bytes_of(&environment));

        if self.viewport_dirty {
            self.upload_viewport();
            self.viewport_dirty = false;
        }

        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RendererError::OutOfMemory),
            Err(err) => {
                log::warn!("Dropping frame: {err}");
                return Ok(());
            }
        };
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        self.accumulate_pass.encode(&mut encoder, self.target);
        self.present_pass
            .encode(&mut encoder, &surface_view, &self.vertex_buffer, self.target);
        self.context.queue.submit(Some(encoder.finish()));
        frame.present();

        self.stats.frame(environment.timestamp);
        self.target = 1 - self.target;
        Ok(())
    }

    /// Read back the most recently completed accumulation and write it as a
    /// PNG into the working directory; returns the file path
    pub fn save_image(&self) -> RendererResult<PathBuf> {
        let size = self.accumulation_size;
        let bytes_per_row = aligned_bytes_per_row(size.x, 4);
        let readback = self.context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("image_readback"),
            size: (bytes_per_row * size.y) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                // the target index points at the next frame's texture, so the
                // last completed image is the other one
                texture: &self.accumulation_textures[1 - self.target],
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(size.y),
                },
            },
            wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
        );
        self.context.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.context.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| RendererError::ReadbackFailed(e.to_string()))?
            .map_err(|e| RendererError::ReadbackFailed(e.to_string()))?;

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((size.x * size.y * 4) as usize);
        for row in 0..size.y {
            let start = (row * bytes_per_row) as usize;
            pixels.extend_from_slice(&mapped[start..start + (size.x * 4) as usize]);
        }
        drop(mapped);
        readback.unmap();

        let image = image::RgbaImage::from_raw(size.x, size.y, pixels)
            .ok_or_else(|| RendererError::ReadbackFailed("pixel buffer size mismatch".into()))?;

        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = PathBuf::from(format!("rosegold-{}-{}.png", seconds, self.nframe as u32));
        image
            .save(&path)
            .map_err(|e| RendererError::ImageWriteFailed(e.to_string()))?;
        Ok(path)
    }

    fn upload_viewport(&self) {
        self.context.queue.write_buffer(
            &self.viewport_buffer,
            0,
            bytemuck::bytes_of(&self.viewport),
        );
        let quad = Quad::for_viewport(self.viewport);
        self.context
            .queue
            .write_buffer(&self.vertex_buffer, 0, quad.vertex_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_the_copy_alignment() {
        assert_eq!(aligned_bytes_per_row(1024, 4), 4096);
        assert_eq!(aligned_bytes_per_row(100, 4), 512);
        assert_eq!(aligned_bytes_per_row(64, 4), 256);
    }
}
