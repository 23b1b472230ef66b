//! Static geometry: the textured cube and the full-screen quad.
//!
//! Both meshes are fixed at compile time. The cube is 24 vertices forming
//! 6 quads split into 2 triangles each (36 indices); the screen quad is
//! 6 unindexed vertices in normalized device coordinates with the V axis
//! flipped so the video's top-left image origin lands where expected.

use wgpu::util::DeviceExt;

/// Cube vertex: homogeneous position, normal and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 4],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl CubeVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 7]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Screen-quad vertex: NDC position plus texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl QuadVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

const fn cv(position: [f32; 4], normal: [f32; 3], tex_coords: [f32; 2]) -> CubeVertex {
    CubeVertex {
        position,
        normal,
        tex_coords,
    }
}

/// One face per 4 vertices, pre-computed face normals.
pub const CUBE_VERTICES: [CubeVertex; 24] = [
    // front (+z)
    cv([-1.0, -1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    cv([1.0, -1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
    cv([1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
    cv([-1.0, 1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
    // back (-z)
    cv([-1.0, -1.0, -1.0, 1.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
    cv([-1.0, 1.0, -1.0, 1.0], [0.0, 0.0, -1.0], [1.0, 0.0]),
    cv([1.0, 1.0, -1.0, 1.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
    cv([1.0, -1.0, -1.0, 1.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
    // top (+y)
    cv([-1.0, 1.0, -1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
    cv([-1.0, 1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    cv([1.0, 1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [1.0, 1.0]),
    cv([1.0, 1.0, -1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]),
    // bottom (-y)
    cv([-1.0, -1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [0.0, 0.0]),
    cv([1.0, -1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [1.0, 0.0]),
    cv([1.0, -1.0, 1.0, 1.0], [0.0, -1.0, 0.0], [1.0, 1.0]),
    cv([-1.0, -1.0, 1.0, 1.0], [0.0, -1.0, 0.0], [0.0, 1.0]),
    // right (+x)
    cv([1.0, -1.0, -1.0, 1.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
    cv([1.0, 1.0, -1.0, 1.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
    cv([1.0, 1.0, 1.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
    cv([1.0, -1.0, 1.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
    // left (-x)
    cv([-1.0, -1.0, -1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 0.0]),
    cv([-1.0, -1.0, 1.0, 1.0], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    cv([-1.0, 1.0, 1.0, 1.0], [-1.0, 0.0, 0.0], [1.0, 1.0]),
    cv([-1.0, 1.0, -1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 1.0]),
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2,    0, 2, 3,
    4, 5, 6,    4, 6, 7,
    8, 9, 10,   8, 10, 11,
    12, 13, 14, 12, 14, 15,
    16, 17, 18, 16, 18, 19,
    20, 21, 22, 20, 22, 23,
];

/// Two triangles covering the viewport. V is flipped: NDC y = -1 (bottom of
/// the screen) samples v = 1 (bottom row of a top-left-origin image).
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { position: [-1.0, -1.0], tex_coords: [0.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0], tex_coords: [0.0, 0.0] },
    QuadVertex { position: [1.0, -1.0], tex_coords: [1.0, 1.0] },
    QuadVertex { position: [1.0, -1.0], tex_coords: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0], tex_coords: [0.0, 0.0] },
    QuadVertex { position: [1.0, 1.0], tex_coords: [1.0, 0.0] },
];

/// GPU buffers for the cube mesh. Built once, never mutated.
#[derive(Debug)]
pub struct CubeGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl CubeGeometry {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Index Buffer"),
            contents: bytemuck::cast_slice(&CUBE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: CUBE_INDICES.len() as u32,
        }
    }
}

/// GPU buffer for the full-screen quad. No index buffer.
#[derive(Debug)]
pub struct QuadGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl QuadGeometry {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: QUAD_VERTICES.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_indices_stay_in_vertex_range() {
        for &i in CUBE_INDICES.iter() {
            assert!((i as usize) < CUBE_VERTICES.len(), "index {i} out of range");
        }
    }

    #[test]
    fn cube_has_twelve_triangles() {
        assert_eq!(CUBE_VERTICES.len(), 24);
        assert_eq!(CUBE_INDICES.len(), 36);
    }

    #[test]
    fn cube_normals_are_unit_face_normals() {
        for v in CUBE_VERTICES.iter() {
            let [x, y, z] = v.normal;
            let len2 = x * x + y * y + z * z;
            assert!((len2 - 1.0).abs() < 1e-6);
            // Each face normal points along exactly one axis.
            assert_eq!(
                [x.abs(), y.abs(), z.abs()].iter().filter(|&&c| c == 1.0).count(),
                1
            );
        }
    }

    #[test]
    fn quad_covers_ndc_with_flipped_v() {
        assert_eq!(QUAD_VERTICES.len(), 6);
        for v in QUAD_VERTICES.iter() {
            let [x, y] = v.position;
            let [u, vv] = v.tex_coords;
            assert!(x == -1.0 || x == 1.0);
            assert!(y == -1.0 || y == 1.0);
            // u follows x directly, v is mirrored against y.
            assert_eq!(u, (x + 1.0) / 2.0);
            assert_eq!(vv, 1.0 - (y + 1.0) / 2.0);
        }
    }
}
