//! glTF/GLB mesh import

use super::types::ImportedMesh;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Read the first primitive of the first mesh in a glTF/GLB file
pub fn import_gltf(input: &Path) -> Result<ImportedMesh> {
    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("Failed to load glTF: {:?}", input))?;

    let mesh = document
        .meshes()
        .next()
        .context("No meshes found in glTF")?;
    if mesh.primitives().len() > 1 {
        tracing::warn!(
            "Mesh {:?} has {} primitives, only the first is baked",
            mesh.name().unwrap_or("<unnamed>"),
            mesh.primitives().len()
        );
    }
    let primitive = mesh
        .primitives()
        .next()
        .context("No primitives found in mesh")?;
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        bail!(
            "Unsupported primitive mode {:?} (only triangle lists can be baked)",
            primitive.mode()
        );
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    // Positions (required)
    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("No positions in mesh")?
        .collect();

    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| iter.collect());
    let uvs: Option<Vec<[f32; 2]>> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect());

    // Non-indexed primitives use vertices in order
    let indices: Vec<u32> = match reader.read_indices() {
        Some(iter) => iter.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    Ok(ImportedMesh {
        positions,
        normals,
        uvs,
        indices,
    })
}
