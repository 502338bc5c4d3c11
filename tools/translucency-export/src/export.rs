//! Bake jobs: load a mesh, bake it, persist the textures

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use translucency_core::{
    BakeReport, BakeSettings, BakeTarget, BakedPaths, BakedTextureStore, TranslucencyBaker,
};

use crate::manifest::BakeManifest;
use crate::mesh::load_mesh;

/// Outcome of one mesh bake
#[derive(Debug, Clone)]
pub struct BakeSummary {
    pub name: String,
    pub report: BakeReport,
    /// Written files, `None` when saving is disabled
    pub paths: Option<BakedPaths>,
}

/// Texture base name for a mesh file: its file stem
pub fn default_name(mesh_path: &Path) -> String {
    mesh_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
        .to_string()
}

/// Bake one mesh file.
///
/// Object-space maps already in the output directory are reused unless the
/// settings force a rebake or ask for a different resolution.
pub fn bake_file(mesh_path: &Path, name: &str, settings: &BakeSettings) -> Result<BakeSummary> {
    let mesh = load_mesh(mesh_path)?;
    let store = BakedTextureStore::new(&settings.output_dir);

    let cached = if settings.force_rebake {
        None
    } else {
        store
            .load_object_space(name)
            .with_context(|| format!("Failed to read cached maps for '{}'", name))?
    };

    let mut target = BakeTarget::new(name, mesh).with_object_space(cached);
    let output = TranslucencyBaker::new(settings.clone())
        .bake(&mut target)
        .with_context(|| format!("Failed to bake {:?}", mesh_path))?;

    let paths = if settings.save_to_disk {
        if output.report.rasterized {
            store
                .save_object_space(name, &output.object_space)
                .with_context(|| format!("Failed to save object-space maps for '{}'", name))?;
        }
        let paths = store
            .save_translucency(name, &output.translucency)
            .with_context(|| format!("Failed to save translucency maps for '{}'", name))?;
        tracing::info!("Saved '{}' textures to {}", name, store.dir().display());
        Some(paths)
    } else {
        None
    };

    Ok(BakeSummary {
        name: name.to_string(),
        report: output.report,
        paths,
    })
}

/// Rasterize one mesh file into object-space maps only
pub fn rasterize_file(
    mesh_path: &Path,
    name: &str,
    settings: &BakeSettings,
) -> Result<Option<BakedPaths>> {
    let mesh = load_mesh(mesh_path)?;
    let mut target = BakeTarget::new(name, mesh);
    let maps = TranslucencyBaker::new(settings.clone())
        .rasterize_only(&mut target)
        .with_context(|| format!("Failed to rasterize {:?}", mesh_path))?;

    if !settings.save_to_disk {
        return Ok(None);
    }
    let store = BakedTextureStore::new(&settings.output_dir);
    let paths = store
        .save_object_space(name, &maps)
        .with_context(|| format!("Failed to save object-space maps for '{}'", name))?;
    Ok(Some(paths))
}

/// Bake every mesh of a manifest.
///
/// Relative paths resolve against `base_dir`; `output` replaces the
/// manifest's output directory for every entry.
pub fn build_all(
    manifest: &BakeManifest,
    base_dir: &Path,
    output: Option<&Path>,
) -> Result<Vec<BakeSummary>> {
    manifest.validate(base_dir)?;

    let mut summaries = Vec::with_capacity(manifest.meshes.len());
    for entry in &manifest.meshes {
        let mut settings = manifest.settings_for(entry);
        settings.output_dir = match output {
            Some(dir) => dir.to_path_buf(),
            None => base_dir.join(&settings.output_dir),
        };
        let path = manifest.mesh_path(base_dir, entry);
        tracing::info!("Baking '{}' from {}", entry.id, path.display());
        summaries.push(bake_file(&path, &entry.id, &settings)?);
    }
    Ok(summaries)
}

/// Directory manifest paths are relative to
pub fn manifest_dir(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_is_file_stem() {
        assert_eq!(default_name(Path::new("models/statue.glb")), "statue");
        assert_eq!(default_name(Path::new("")), "mesh");
    }

    #[test]
    fn test_manifest_dir() {
        assert_eq!(manifest_dir(Path::new("assets/bake.toml")), PathBuf::from("assets"));
        assert_eq!(manifest_dir(Path::new("bake.toml")), PathBuf::from(""));
    }
}
