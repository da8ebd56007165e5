//! Loading meshes and textures from external files.
//!
//! On native targets assets are read from `./assets/`; on the web they are
//! fetched relative to the page origin. OBJ meshes are flattened into
//! [`MeshBuffers`] streams so every mesh feeds the same pipeline.

use std::io::{BufReader, Cursor};

use anyhow::Context as _;

use crate::data_structures::{mesh::MeshBuffers, texture::Texture};

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> reqwest::Url {
    let window = web_sys::window().unwrap();
    let location = window.location();
    let origin = format!("{}/assets", location.origin().unwrap());
    let base = reqwest::Url::parse(&format!("{}/", origin)).unwrap();
    base.join(file_name).unwrap()
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name);
        reqwest::get(url).await?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name);
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?
    };

    Ok(data)
}

pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(file_name).await?;
    Texture::from_bytes(device, queue, &data, file_name)
}

/// Like [`load_texture`], but a missing or undecodable file degrades to the
/// 1x1 white fallback instead of failing the whole scene load.
pub async fn load_texture_or_fallback(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Texture {
    match load_texture(file_name, device, queue).await {
        Ok(texture) => texture,
        Err(err) => {
            log::warn!("falling back to white texture for {file_name}: {err:#}");
            Texture::create_fallback_texture(device, queue)
        }
    }
}

/// Loads an OBJ file into a single [`MeshBuffers`].
///
/// All models in the file are concatenated. Vertex colors come from each
/// model's material diffuse color, white when the file has no materials.
/// UVs are flipped vertically to match the texture coordinate origin.
pub async fn load_mesh_obj(file_name: &str) -> anyhow::Result<MeshBuffers> {
    let obj_text: String = load_string(file_name).await?;
    let obj_cursor = Cursor::new(obj_text);
    let mut obj_reader = BufReader::new(obj_cursor);

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| async move {
            let mat_text = match load_string(&p).await {
                Ok(text) => text,
                Err(_) => return Err(tobj::LoadError::OpenFileFailed),
            };
            tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text)))
        },
    )
    .await
    .with_context(|| format!("failed to parse {file_name}"))?;

    let diffuse_colors: Vec<[f32; 4]> = match obj_materials {
        Ok(materials) => materials
            .iter()
            .map(|m| match m.diffuse {
                Some([r, g, b]) => [r, g, b, 1.0],
                None => [1.0, 1.0, 1.0, 1.0],
            })
            .collect(),
        Err(err) => {
            log::warn!("no materials for {file_name}: {err}");
            Vec::new()
        }
    };

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut colors = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for m in &models {
        let color = m
            .mesh
            .material_id
            .and_then(|id| diffuse_colors.get(id).copied())
            .unwrap_or([1.0, 1.0, 1.0, 1.0]);
        let base = positions.len() as u32;
        let vertex_count = m.mesh.positions.len() / 3;

        for i in 0..vertex_count {
            positions.push([
                m.mesh.positions[i * 3],
                m.mesh.positions[i * 3 + 1],
                m.mesh.positions[i * 3 + 2],
                1.0,
            ]);
            // Normals may be absent in the file; zero-fill keeps the streams
            // aligned and the shader normalizes anyway.
            normals.push([
                m.mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                m.mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                m.mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
                0.0,
            ]);
            colors.push(color);
            uvs.push([
                m.mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - m.mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ]);
        }
        indices.extend(m.mesh.indices.iter().map(|i| base + i));
    }

    MeshBuffers::new(positions, normals, colors, Some(uvs), indices)
        .with_context(|| format!("invalid mesh data in {file_name}"))
}
