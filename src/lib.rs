//! rosegold — a progressive compute-shader renderer
//!
//! A compute kernel traces one sample per pixel per frame and folds it into
//! a running average; a render pass presents the average on a viewport-sized
//! quad. Host and GPU code agree on buffer slots, attribute locations and
//! struct layouts through the shared schema in [`shader_types`].
//!
//! # Modules
//! - [`shader_types`]: the CPU/GPU layout contract
//! - [`scene`]: camera state and velocity-driven motion
//! - [`resources`]: CPU-side vertex data construction
//! - [`renderer`]: wgpu context, accumulation and present passes
//! - [`stats`]: frame pacing reports
//! - [`window`]: winit shell and keyboard mapping

pub mod renderer;
pub mod resources;
pub mod scene;
pub mod shader_types;
pub mod stats;
pub mod window;

pub use renderer::{Renderer, RendererError, RendererResult};
pub use scene::Camera;
pub use window::{map_key, InputCommand, Window};

/// Configuration for initializing the renderer
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// Edge length of the square accumulation target in pixels
    pub accumulation_size: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "rosegold".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            accumulation_size: 1024,
        }
    }
}
