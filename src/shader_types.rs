//! Types and slot constants shared between host code and the GPU shaders
//!
//! Both sides of the GPU boundary interpret the same raw bytes, so the field
//! order, primitive widths and slot numbers declared here must match the
//! declarations in the embedded WGSL exactly. The `tests/` directory carries
//! a reflection test that keeps the two in lockstep.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Buffer binding slots
///
/// `Vertices` addresses a vertex buffer slot; the other two address
/// `@binding` slots inside the buffer bind group (group 0).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferIndex {
    /// Quad vertex data
    Vertices = 0,
    /// Viewport dimensions in pixels
    ViewportSize = 1,
    /// Per-frame environment uniform
    Environment = 2,
}

/// Per-vertex attribute slots (`@location` values of the vertex inputs)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    Position = 0,
    Texcoord = 1,
}

/// Texture binding slots (`@binding` slots inside the texture bind group)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureIndex {
    /// Accumulated image from the previous frame
    Input = 0,
    /// Accumulation target written by the kernel, sampled by the present pass
    Output = 1,
}

/// A single quad vertex
///
/// Positions are in pixel space (a value of 100 indicates 100 pixels from the
/// viewport center); texture coordinates are normalized.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec2,  // 8 bytes, offset 0
    pub tex_coord: Vec2, // 8 bytes, offset 8
}

/// Per-frame environment uniform
///
/// Uploaded once per frame and read-only during that frame's GPU execution.
/// The padding keeps every field at the offset the WGSL uniform layout
/// assigns it (vec3 carries 16-byte alignment there).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Environment {
    /// Frames accumulated into the current image
    pub nframe: f32, // offset 0
    /// Seconds since renderer start
    pub timestamp: f32, // offset 4
    pub _pad0: [f32; 2],
    /// World-space camera position
    pub camera_position: Vec3, // offset 16
    pub _pad1: f32,
    /// Camera orientation: x = yaw around the vertical axis, y = pitch
    pub camera_direction: Vec2, // offset 32
    pub _pad2: [f32; 2],
}

impl Environment {
    pub fn new(nframe: f32, timestamp: f32, camera_position: Vec3, camera_direction: Vec2) -> Self {
        Self {
            nframe,
            timestamp,
            camera_position,
            camera_direction,
            ..Zeroable::zeroed()
        }
    }
}
