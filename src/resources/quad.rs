//! Viewport quad generation

use glam::{UVec2, Vec2};

use crate::shader_types::Vertex;

/// The presentation quad: two triangles in pixel space, square, centered on
/// the viewport origin
///
/// Rebuilt whenever the viewport changes; uploaded verbatim into the vertex
/// buffer at `BufferIndex::Vertices`.
#[derive(Debug, Clone)]
pub struct Quad {
    vertices: [Vertex; 6],
}

impl Quad {
    pub const VERTEX_COUNT: u32 = 6;

    /// Build a quad sized to the smaller viewport axis
    pub fn for_viewport(viewport: UVec2) -> Self {
        let half = viewport.min_element() as f32 / 2.0;

        let vertex = |x: f32, y: f32, u: f32, v: f32| Vertex {
            position: Vec2::new(x, y),
            tex_coord: Vec2::new(u, v),
        };

        Self {
            vertices: [
                vertex(half, -half, 1.0, 0.0),
                vertex(-half, -half, 0.0, 0.0),
                vertex(-half, half, 0.0, 1.0),
                vertex(half, -half, 1.0, 0.0),
                vertex(-half, half, 0.0, 1.0),
                vertex(half, half, 1.0, 1.0),
            ],
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Vertex data as bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_extent_comes_from_the_smaller_axis() {
        let quad = Quad::for_viewport(UVec2::new(1920, 1080));
        for vertex in quad.vertices() {
            assert_eq!(vertex.position.x.abs(), 540.0);
            assert_eq!(vertex.position.y.abs(), 540.0);
        }
    }

    #[test]
    fn texture_coordinates_cover_the_unit_square() {
        let quad = Quad::for_viewport(UVec2::new(800, 600));
        for vertex in quad.vertices() {
            let uv = vertex.tex_coord;
            assert!(uv.x == 0.0 || uv.x == 1.0);
            assert!(uv.y == 0.0 || uv.y == 1.0);
            // corner positions and texture coordinates agree in sign
            assert_eq!(uv.x == 1.0, vertex.position.x > 0.0);
            assert_eq!(uv.y == 1.0, vertex.position.y > 0.0);
        }
    }

    #[test]
    fn byte_view_covers_all_six_vertices() {
        let quad = Quad::for_viewport(UVec2::new(1024, 1024));
        assert_eq!(
            quad.vertex_bytes().len(),
            Quad::VERTEX_COUNT as usize * std::mem::size_of::<Vertex>()
        );
    }
}
