//! Interleaved vertex layout shared by every mesh.

use std::mem;

use crate::data_structures::mesh::MeshError;

/// Number of floats making up one [`Vertex`] in a flat array.
pub const FLOATS_PER_VERTEX: usize = 8;

/// One sample of mesh geometry: position, normal, texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

/// Vertex attribute names as the vertex stage declares them.
pub const POSITION_ATTRIBUTE: &str = "aPosition";
pub const NORMAL_ATTRIBUTE: &str = "aNormal";
pub const TEX_COORDS_ATTRIBUTE: &str = "aTexCoords";

impl Vertex {
    pub const SIZE: wgpu::BufferAddress = mem::size_of::<Vertex>() as wgpu::BufferAddress;

    /// Attribute name, byte offset and format of every field, in layout order.
    pub const ATTRIBUTES: [(&'static str, wgpu::BufferAddress, wgpu::VertexFormat); 3] = [
        (POSITION_ATTRIBUTE, 0, wgpu::VertexFormat::Float32x3),
        (
            NORMAL_ATTRIBUTE,
            mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            wgpu::VertexFormat::Float32x3,
        ),
        (
            TEX_COORDS_ATTRIBUTE,
            mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
            wgpu::VertexFormat::Float32x2,
        ),
    ];

    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }

    /// Splits a flat `[px, py, pz, nx, ny, nz, u, v, ...]` array into vertices.
    pub fn from_floats(data: &[f32]) -> Result<Vec<Vertex>, MeshError> {
        if data.len() % FLOATS_PER_VERTEX != 0 {
            return Err(MeshError::Layout { len: data.len() });
        }
        Ok(data
            .chunks_exact(FLOATS_PER_VERTEX)
            .map(|v| Vertex::new([v[0], v[1], v[2]], [v[3], v[4], v[5]], [v[6], v[7]]))
            .collect())
    }

    /// Buffer layout for the given resolved attribute list.
    ///
    /// The list is built by the shader program from its vertex stage, so an
    /// attribute the stage does not declare is simply absent.
    pub fn desc(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}
