//! Renderable geometry with its own GPU state.
//!
//! A [`Mesh`] owns its vertices, a vertex buffer and one uniform buffer per
//! uniform block of its program, plus the bind groups referencing them. The
//! program and the texture are shared. Because every mesh has its own
//! uniform buffers, many meshes can use one program within a single pass.

use std::rc::Rc;

use cgmath::{EuclideanSpace, Matrix4};
use wgpu::util::DeviceExt;

use crate::{
    camera::Camera,
    data_structures::{texture::Texture, vertex::Vertex},
    pipelines::{reflect::ResourceKind, shader::ShaderProgram},
    resources::obj::{ObjError, parse_obj},
};

/// Texture unit the mesh texture is bound to.
pub const TEXTURE_UNIT: usize = 0;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("vertex data has {len} floats, expected a multiple of 8")]
    Layout { len: usize },
    #[error(transparent)]
    Obj(#[from] ObjError),
}

#[derive(Debug)]
struct GpuState {
    vertex_buffer: wgpu::Buffer,
    /// Parallel to the program's uniform blocks.
    uniform_buffers: Vec<wgpu::Buffer>,
    /// One per bind group index of the program.
    bind_groups: Vec<wgpu::BindGroup>,
}

#[derive(Debug)]
pub struct Mesh {
    label: String,
    shader: Rc<ShaderProgram>,
    texture: Option<Rc<Texture>>,
    vertices: Vec<Vertex>,
    gpu: Option<GpuState>,
}

impl Mesh {
    /// Builds a mesh from `[px, py, pz, nx, ny, nz, u, v, ...]`.
    pub fn from_floats(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &[f32],
        shader: Rc<ShaderProgram>,
        texture: Option<Rc<Texture>>,
    ) -> Result<Self, MeshError> {
        let vertices = Vertex::from_floats(data)?;
        Ok(Self::from_vertices(
            device, queue, label, vertices, shader, texture,
        ))
    }

    /// Builds a mesh from mesh-file text.
    pub fn from_obj(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        source: &str,
        shader: Rc<ShaderProgram>,
        texture: Option<Rc<Texture>>,
    ) -> Result<Self, MeshError> {
        let vertices = parse_obj(source)?;
        Ok(Self::from_vertices(
            device, queue, label, vertices, shader, texture,
        ))
    }

    pub fn from_vertices(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        vertices: Vec<Vertex>,
        shader: Rc<ShaderProgram>,
        texture: Option<Rc<Texture>>,
    ) -> Self {
        let mut mesh = Self {
            label: label.to_string(),
            shader,
            texture,
            vertices,
            gpu: None,
        };
        mesh.init_gpu_buffers(device, queue);
        mesh
    }

    fn init_gpu_buffers(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} vertex buffer", self.label)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffers: Vec<wgpu::Buffer> = self
            .shader
            .uniforms()
            .blocks()
            .iter()
            .map(|block| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{} {}", self.label, block.name)),
                    size: uniform_buffer_size(block.size()),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let layout = self.shader.layout();
        let needs_fallback = layout.resources.iter().any(|r| match r.kind {
            ResourceKind::Texture { unit } | ResourceKind::Sampler { unit } => {
                unit != TEXTURE_UNIT || self.texture.is_none()
            }
            ResourceKind::Uniform { .. } => false,
        });
        let fallback = needs_fallback.then(|| Texture::create_blank(device, queue));
        let mesh_texture = self.texture.as_deref();
        let texture_for = |unit: usize| {
            if unit == TEXTURE_UNIT {
                mesh_texture.or(fallback.as_ref())
            } else {
                fallback.as_ref()
            }
        };

        let mut bind_groups = Vec::new();
        for (group, bind_group_layout) in self.shader.bind_group_layouts().iter().enumerate() {
            let mut entries = Vec::new();
            for resource in layout.resources_in(group as u32) {
                let resource_binding = match resource.kind {
                    ResourceKind::Uniform { block } => uniform_buffers[block].as_entire_binding(),
                    ResourceKind::Texture { unit } => match texture_for(unit) {
                        Some(texture) => wgpu::BindingResource::TextureView(&texture.view),
                        None => continue,
                    },
                    ResourceKind::Sampler { unit } => match texture_for(unit) {
                        Some(texture) => wgpu::BindingResource::Sampler(&texture.sampler),
                        None => continue,
                    },
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: resource.binding,
                    resource: resource_binding,
                });
            }
            bind_groups.push(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} group {}", self.label, group)),
                layout: bind_group_layout,
                entries: &entries,
            }));
        }

        log::debug!(
            "uploaded mesh `{}`: {} vertices, {} uniform buffers",
            self.label,
            self.vertices.len(),
            uniform_buffers.len()
        );
        self.gpu = Some(GpuState {
            vertex_buffer,
            uniform_buffers,
            bind_groups,
        });
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn shader(&self) -> &Rc<ShaderProgram> {
        &self.shader
    }

    pub fn is_disposed(&self) -> bool {
        self.gpu.is_none()
    }

    /// Draws all vertices as a triangle list with `model` as object transform.
    ///
    /// The program's staged uniforms are copied into this mesh's buffers, so
    /// lighting must be preset before the first mesh of the frame draws.
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        camera: &Camera,
        model: Matrix4<f32>,
    ) {
        let Some(gpu) = &self.gpu else {
            log::warn!("skipping draw of disposed mesh `{}`", self.label);
            return;
        };
        if self.vertices.is_empty() || !self.shader.bind(pass) {
            return;
        }

        self.shader.set_matrix4("model", model);
        self.shader.set_matrix4("view", camera.view_matrix());
        self.shader.set_matrix4("projection", camera.projection_matrix());
        self.shader
            .set_vector3("viewPosition", camera.position().to_vec());

        for (block, buffer) in self
            .shader
            .uniforms()
            .blocks()
            .iter()
            .zip(&gpu.uniform_buffers)
        {
            queue.write_buffer(buffer, 0, block.bytes());
        }
        for (index, bind_group) in gpu.bind_groups.iter().enumerate() {
            pass.set_bind_group(index as u32, bind_group, &[]);
        }
        pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        pass.draw(0..self.vertices.len() as u32, 0..1);
    }

    /// Releases the GPU buffers and bind groups. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.vertex_buffer.destroy();
            gpu.uniform_buffers.iter().for_each(wgpu::Buffer::destroy);
            log::debug!("disposed mesh `{}`", self.label);
        }
    }
}

/// Uniform buffers are at least 16 bytes and a multiple of 16.
pub fn uniform_buffer_size(block_size: usize) -> wgpu::BufferAddress {
    (block_size.max(1).div_ceil(16) * 16) as wgpu::BufferAddress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_buffers_are_padded_to_16_bytes() {
        assert_eq!(uniform_buffer_size(0), 16);
        assert_eq!(uniform_buffer_size(4), 16);
        assert_eq!(uniform_buffer_size(16), 16);
        assert_eq!(uniform_buffer_size(64), 64);
        assert_eq!(uniform_buffer_size(260), 272);
    }
}
