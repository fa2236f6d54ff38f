//! Byte-layout guarantees of the shared schema
//!
//! Host code and the GPU shaders interpret the same raw bytes, so the sizes,
//! offsets and slot values asserted here are contract, not implementation
//! detail.

use std::mem::{align_of, offset_of, size_of};

use glam::{UVec2, Vec2, Vec3};

use rosegold::resources::Quad;
use rosegold::shader_types::{BufferIndex, Environment, TextureIndex, Vertex, VertexAttribute};

#[test]
fn slot_values_are_stable() {
    assert_eq!(BufferIndex::Vertices as u32, 0);
    assert_eq!(BufferIndex::ViewportSize as u32, 1);
    assert_eq!(BufferIndex::Environment as u32, 2);

    assert_eq!(VertexAttribute::Position as u32, 0);
    assert_eq!(VertexAttribute::Texcoord as u32, 1);

    assert_eq!(TextureIndex::Input as u32, 0);
    assert_eq!(TextureIndex::Output as u32, 1);
}

#[test]
fn vertex_is_four_floats_with_no_padding() {
    assert_eq!(size_of::<Vertex>(), 4 * size_of::<f32>());
    assert_eq!(offset_of!(Vertex, position), 0);
    assert_eq!(offset_of!(Vertex, tex_coord), 8);
}

#[test]
fn environment_matches_the_uniform_layout() {
    // nframe / timestamp / camera_position / camera_direction at the offsets
    // the WGSL uniform address space assigns them (vec3 is 16-byte aligned)
    assert_eq!(offset_of!(Environment, nframe), 0);
    assert_eq!(offset_of!(Environment, timestamp), 4);
    assert_eq!(offset_of!(Environment, camera_position), 16);
    assert_eq!(offset_of!(Environment, camera_direction), 32);
    assert_eq!(size_of::<Environment>(), 48);
    assert_eq!(align_of::<Environment>(), 4);
}

#[test]
fn vertex_bytes_round_trip_bit_exact() {
    let vertex = Vertex {
        position: Vec2::new(10.0, 20.0),
        tex_coord: Vec2::new(0.5, 0.5),
    };

    let bytes = bytemuck::bytes_of(&vertex).to_vec();
    let restored: &Vertex = bytemuck::from_bytes(&bytes);

    assert_eq!(restored.position.x.to_bits(), vertex.position.x.to_bits());
    assert_eq!(restored.position.y.to_bits(), vertex.position.y.to_bits());
    assert_eq!(restored.tex_coord.x.to_bits(), vertex.tex_coord.x.to_bits());
    assert_eq!(restored.tex_coord.y.to_bits(), vertex.tex_coord.y.to_bits());
}

#[test]
fn environment_bytes_round_trip_bit_exact() {
    let environment = Environment::new(
        7.0,
        123.456,
        Vec3::new(50.0, 40.8, 150.0),
        Vec2::new(-0.25, 0.125),
    );

    let bytes = bytemuck::bytes_of(&environment).to_vec();
    let restored: &Environment = bytemuck::from_bytes(&bytes);

    assert_eq!(bytemuck::bytes_of(restored), bytes.as_slice());
    assert_eq!(restored.nframe.to_bits(), environment.nframe.to_bits());
    assert_eq!(
        restored.camera_position.z.to_bits(),
        environment.camera_position.z.to_bits()
    );
}

/// A stand-in for the binding table the GPU sees: one byte region per slot,
/// populated the way the renderer populates its bind groups.
fn populated_slots() -> [Vec<u8>; 3] {
    let quad = Quad::for_viewport(UVec2::new(800, 600));
    let viewport = UVec2::new(800, 600);
    let environment = Environment::new(3.0, 1.5, Vec3::new(50.0, 40.8, 150.0), Vec2::ZERO);

    let mut slots: [Vec<u8>; 3] = Default::default();
    slots[BufferIndex::Vertices as usize] = quad.vertex_bytes().to_vec();
    slots[BufferIndex::ViewportSize as usize] = bytemuck::bytes_of(&viewport).to_vec();
    slots[BufferIndex::Environment as usize] = bytemuck::bytes_of(&environment).to_vec();
    slots
}

#[test]
fn environment_slot_yields_the_camera_that_was_uploaded() {
    let slots = populated_slots();

    let bytes = &slots[BufferIndex::Environment as usize];
    let environment: &Environment = bytemuck::from_bytes(bytes);
    assert_eq!(environment.camera_position, Vec3::new(50.0, 40.8, 150.0));
    assert_eq!(environment.nframe, 3.0);
}

#[test]
fn wrong_slot_is_detectable_as_a_mismatch() {
    let slots = populated_slots();

    // a consumer wired to slot 1 instead of slot 2 cannot see environment
    // data: the region has the wrong length, and its bytes differ
    let wrong = &slots[1];
    assert_ne!(wrong.len(), size_of::<Environment>());
    assert_ne!(wrong.as_slice(), slots[BufferIndex::Environment as usize]);
}
