//! Host-side staging of a program's uniform values.
//!
//! Every `var<uniform>` binding of a program is one [`UniformBlock`]: a byte
//! image of the WGSL value. Leaves (scalars, vectors, matrices) are addressed
//! by their GLSL-style name (`material.shininess`, `pointLights[1].linear`)
//! and resolve to a [`UniformLocation`] inside one block. Setters write into
//! the staged bytes; meshes copy the blocks into their own GPU buffers when
//! they draw.

use std::collections::HashMap;

use cgmath::{Matrix4, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Int,
    Float,
    Vec3,
    Mat4,
    /// A leaf no setter writes (`vec2`, `vec4`, `u32`, ...).
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation {
    pub block: usize,
    pub offset: usize,
    pub kind: UniformKind,
}

#[derive(Debug, Clone)]
pub struct UniformBlock {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    data: Vec<u8>,
}

impl UniformBlock {
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Uniforms {
    locations: HashMap<String, UniformLocation>,
    blocks: Vec<UniformBlock>,
}

impl Uniforms {
    /// Adds a zero-filled block and returns its index.
    pub(crate) fn add_block(&mut self, name: &str, group: u32, binding: u32, size: usize) -> usize {
        self.blocks.push(UniformBlock {
            name: name.to_string(),
            group,
            binding,
            data: vec![0; size],
        });
        self.blocks.len() - 1
    }

    pub(crate) fn insert(&mut self, name: String, location: UniformLocation) {
        self.locations.insert(name, location);
    }

    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn blocks(&self) -> &[UniformBlock] {
        &self.blocks
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.write(name, UniformKind::Int, bytemuck::bytes_of(&value));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.write(name, UniformKind::Float, bytemuck::bytes_of(&value));
    }

    pub fn set_vector3(&mut self, name: &str, value: Vector3<f32>) {
        let value: [f32; 3] = value.into();
        self.write(name, UniformKind::Vec3, bytemuck::bytes_of(&value));
    }

    pub fn set_matrix4(&mut self, name: &str, value: Matrix4<f32>) {
        // Column major, same as WGSL `mat4x4<f32>`.
        let value: [[f32; 4]; 4] = value.into();
        self.write(name, UniformKind::Mat4, bytemuck::bytes_of(&value));
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.read(name, UniformKind::Int)
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.read(name, UniformKind::Float)
    }

    pub fn get_vector3(&self, name: &str) -> Option<Vector3<f32>> {
        self.read::<[f32; 3]>(name, UniformKind::Vec3).map(Vector3::from)
    }

    pub fn get_matrix4(&self, name: &str) -> Option<Matrix4<f32>> {
        self.read::<[[f32; 4]; 4]>(name, UniformKind::Mat4)
            .map(Matrix4::from)
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) {
        let Some(location) = self.locations.get(name) else {
            log::trace!("skipping unknown uniform `{name}`");
            return;
        };
        if location.kind != kind {
            log::trace!(
                "skipping uniform `{name}`: declared as {:?}, written as {:?}",
                location.kind,
                kind
            );
            return;
        }
        let block = &mut self.blocks[location.block];
        block.data[location.offset..location.offset + bytes.len()].copy_from_slice(bytes);
    }

    fn read<T: bytemuck::Pod>(&self, name: &str, kind: UniformKind) -> Option<T> {
        let location = self.locations.get(name).filter(|l| l.kind == kind)?;
        let block = &self.blocks[location.block];
        let end = location.offset + std::mem::size_of::<T>();
        Some(bytemuck::pod_read_unaligned(&block.data[location.offset..end]))
    }
}
