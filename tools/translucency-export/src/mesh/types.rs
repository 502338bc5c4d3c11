//! Imported mesh data before validation

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use translucency_core::{BakeError, Mesh};

/// Vertex streams as read from a file, with optional attributes still optional
#[derive(Debug, Clone, Default)]
pub struct ImportedMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Flat triangle list
    pub indices: Vec<u32>,
}

impl ImportedMesh {
    /// Convert to a core mesh, failing if UVs or normals are absent
    pub fn into_mesh(self) -> Result<Mesh> {
        let uvs = self.uvs.ok_or(BakeError::MissingUvs)?;
        let normals = self.normals.ok_or(BakeError::MissingNormals)?;

        if self.indices.len() % 3 != 0 {
            tracing::warn!(
                "Index count {} is not a multiple of 3, dropping the trailing {}",
                self.indices.len(),
                self.indices.len() % 3
            );
        }
        let triangles = self
            .indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        let mesh = Mesh::new(
            self.positions.into_iter().map(Vec3::from).collect(),
            normals.into_iter().map(Vec3::from).collect(),
            uvs.into_iter().map(Vec2::from).collect(),
            triangles,
        );
        mesh.validate().context("Mesh cannot be baked")?;
        Ok(mesh)
    }
}
