//! Mesh import (OBJ/glTF -> translucency_core::Mesh)

mod gltf;
mod obj;
mod types;

use anyhow::Result;
use std::path::Path;
use translucency_core::Mesh;

pub use gltf::import_gltf;
pub use obj::import_obj;
pub use types::ImportedMesh;

/// Load a mesh, detecting the format by extension
pub fn load_mesh(path: &Path) -> Result<Mesh> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let imported = match ext.as_str() {
        "obj" => import_obj(path)?,
        "gltf" | "glb" => import_gltf(path)?,
        _ => anyhow::bail!(
            "Unsupported mesh format: {:?} (use .obj, .gltf, or .glb)",
            path
        ),
    };

    tracing::info!(
        "Loaded {:?}: {} vertices, {} triangles",
        path,
        imported.positions.len(),
        imported.indices.len() / 3
    );
    imported.into_mesh()
}
