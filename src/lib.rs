//! lantern
//!
//! A small real-time scene viewer on top of wgpu. It parses triangulated
//! meshes, links WGSL programs with name-addressed uniforms, flies a free
//! camera and renders a ring of lit objects around point-light lamps.
//!
//! High-level modules
//! - `camera`: yaw/pitch camera with view and projection matrices
//! - `context`: window, surface and GPU handles
//! - `data_structures`: vertices, meshes and textures
//! - `flow`: the event pump driving a [`flow::SceneHandler`]
//! - `fps`: frame counter and the periodic FPS report
//! - `input`: per-frame keyboard and mouse snapshot
//! - `pipelines`: shader programs, uniform reflection and the lighting model
//! - `resources`: asset loading and the mesh file parser
//! - `scene`: the scene loop and its presets
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod fps;
pub mod input;
pub mod pipelines;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use winit::event::{DeviceEvent, WindowEvent};
