//! Shader programs and the uniform data they consume.
//!
//! - `reflect` compiles WGSL stages and links them into a [`reflect::ProgramLayout`]
//! - `uniforms` stages uniform values by name on the host
//! - `shader` owns the linked program and its render pipeline
//! - `lighting` is the fixed multi-light model uploaded every frame

pub mod lighting;
pub mod reflect;
pub mod shader;
pub mod uniforms;
