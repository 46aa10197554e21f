//! Loading of assets from the `assets/` directory.
//!
//! Paths passed to these helpers are relative to [`ASSET_DIR`]. Every error
//! names the file that failed.

use std::path::PathBuf;

use anyhow::Context as _;

use crate::data_structures::{texture::Texture, vertex::Vertex};

pub mod obj;

pub const ASSET_DIR: &str = "assets";

pub fn asset_path(file_name: &str) -> PathBuf {
    std::path::Path::new("./").join(ASSET_DIR).join(file_name)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    let path = asset_path(file_name);
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = asset_path(file_name);
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(file_name).await?;
    let format = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str());
    Texture::from_bytes(device, queue, &data, file_name, format)
        .with_context(|| format!("failed to decode texture {file_name}"))
}

/// Reads and parses a mesh file into expanded vertices.
pub async fn load_obj(file_name: &str) -> anyhow::Result<Vec<Vertex>> {
    let text = load_string(file_name).await?;
    let vertices =
        obj::parse_obj(&text).with_context(|| format!("failed to parse mesh {file_name}"))?;
    log::info!("loaded {file_name}: {} vertices", vertices.len());
    Ok(vertices)
}

/// Reads the vertex and fragment sources of one program.
pub async fn load_shader(vertex: &str, fragment: &str) -> anyhow::Result<(String, String)> {
    futures::try_join!(load_string(vertex), load_string(fragment))
}
