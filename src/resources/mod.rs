//! Asset loading helpers.
//!
//! Assets live next to the binary under `./assets/` (the build script copies
//! them to `OUT_DIR` for packaged runs). Only one asset exists in this
//! renderer: the cube's surface texture.

use crate::data_structures::texture;

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    // TODO: pass env for absolute path from lib caller
    let path = std::path::Path::new("./").join("assets").join(file_name);
    let data = tokio::fs::read(path).await?;
    Ok(data)
}

pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let data = load_binary(file_name).await?;
    texture::Texture::from_bytes(device, queue, &data, file_name)
}

/// Load the cube surface texture, falling back to a plain white texture when
/// the asset is missing or undecodable. Load failure is logged, not fatal.
pub async fn load_texture_or_default(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> texture::Texture {
    match load_texture(file_name, device, queue).await {
        Ok(tex) => tex,
        Err(e) => {
            log::error!("failed to load texture asset {file_name}: {e}");
            texture::Texture::create_default_texture(device, queue)
        }
    }
}
