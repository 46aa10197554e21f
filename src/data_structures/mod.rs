//! Geometry and GPU resource types.
//!
//! - `vertex` is the interleaved vertex layout shared by every mesh
//! - `mesh` holds vertices plus their per-mesh GPU state
//! - `texture` wraps GPU textures (decoded images, depth, blank fallback)

pub mod mesh;
pub mod texture;
pub mod vertex;
