//! Vertex types for 2D sprite rendering

use bytemuck::{Pod, Zeroable};

/// Textured 2D vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Append two triangles covering an NDC rectangle, v flipped so image row 0
/// lands at the top of the sprite.
pub fn push_quad(out: &mut Vec<Vertex>, x0: f32, y0: f32, x1: f32, y1: f32) {
    out.push(Vertex::new(x0, y0, 0.0, 1.0));
    out.push(Vertex::new(x1, y0, 1.0, 1.0));
    out.push(Vertex::new(x1, y1, 1.0, 0.0));
    out.push(Vertex::new(x0, y0, 0.0, 1.0));
    out.push(Vertex::new(x1, y1, 1.0, 0.0));
    out.push(Vertex::new(x0, y1, 0.0, 0.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_has_two_ccw_triangles() {
        let mut verts = Vec::new();
        push_quad(&mut verts, -1.0, -1.0, 1.0, 1.0);
        assert_eq!(verts.len(), 6);
        // Corners covered
        assert_eq!(verts[0].position, [-1.0, -1.0]);
        assert_eq!(verts[2].position, [1.0, 1.0]);
        // Texture v runs top-down while y runs bottom-up
        assert_eq!(verts[0].uv, [0.0, 1.0]);
        assert_eq!(verts[5].uv, [0.0, 0.0]);
    }
}
