//! bake.toml manifest parsing
//!
//! ```toml
//! [settings]
//! resolution = 128
//! output_dir = "baked"
//!
//! [settings.material]
//! density = 80.0
//!
//! [[meshes]]
//! id = "statue"
//! path = "models/statue.glb"
//! resolution = 256
//! material = { transparency = 0.9 }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use translucency_core::BakeSettings;

/// bake.toml manifest structure
#[derive(Debug, Default, Deserialize)]
pub struct BakeManifest {
    /// Settings shared by every mesh
    #[serde(default)]
    pub settings: BakeSettings,
    #[serde(default)]
    pub meshes: Vec<MeshEntry>,
}

/// Single mesh entry
#[derive(Debug, Deserialize)]
pub struct MeshEntry {
    /// Names the baked textures
    pub id: String,
    /// Mesh file, relative to the manifest
    pub path: String,
    #[serde(default)]
    pub resolution: Option<i32>,
    #[serde(default)]
    pub multisample: Option<i32>,
    #[serde(default)]
    pub spread: Option<i32>,
    #[serde(default)]
    pub material: MaterialOverrides,
}

/// Per-mesh material overrides, unset fields keep the shared value
#[derive(Debug, Default, Deserialize)]
pub struct MaterialOverrides {
    pub transparency: Option<f32>,
    pub intensity: Option<f32>,
    pub density: Option<f32>,
    pub depth_cutout: Option<f32>,
    pub tint: Option<[f32; 3]>,
}

impl BakeManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse bake.toml")
    }

    /// Settings for one entry: shared settings with the entry's overrides applied
    pub fn settings_for(&self, entry: &MeshEntry) -> BakeSettings {
        let mut settings = self.settings.clone();
        if let Some(resolution) = entry.resolution {
            settings.resolution = resolution;
        }
        if let Some(multisample) = entry.multisample {
            settings.multisample = multisample;
        }
        if let Some(spread) = entry.spread {
            settings.spread = spread;
        }

        let overrides = &entry.material;
        let material = &mut settings.material;
        if let Some(v) = overrides.transparency {
            material.transparency = v;
        }
        if let Some(v) = overrides.intensity {
            material.intensity = v;
        }
        if let Some(v) = overrides.density {
            material.density = v;
        }
        if let Some(v) = overrides.depth_cutout {
            material.depth_cutout = v;
        }
        if let Some(v) = overrides.tint {
            material.tint = v;
        }
        settings
    }

    /// Resolve an entry's mesh path against the manifest directory
    pub fn mesh_path(&self, base_dir: &Path, entry: &MeshEntry) -> PathBuf {
        base_dir.join(&entry.path)
    }

    /// Validate entries without loading any mesh
    pub fn validate(&self, base_dir: &Path) -> Result<()> {
        if self.meshes.is_empty() {
            anyhow::bail!("Manifest declares no [[meshes]]");
        }

        let mut ids = HashSet::new();
        for entry in &self.meshes {
            if entry.id.is_empty() {
                anyhow::bail!("Mesh entry for {:?} has an empty id", entry.path);
            }
            if !ids.insert(entry.id.as_str()) {
                anyhow::bail!("Duplicate mesh id '{}'", entry.id);
            }

            let path = self.mesh_path(base_dir, entry);
            if !path.is_file() {
                anyhow::bail!("Mesh '{}' not found at {}", entry.id, path.display());
            }
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_lowercase())
                .unwrap_or_default();
            if !matches!(ext.as_str(), "obj" | "gltf" | "glb") {
                anyhow::bail!(
                    "Mesh '{}' has unsupported format {:?} (use .obj, .gltf, or .glb)",
                    entry.id,
                    path
                );
            }

            for warning in self.settings_for(entry).material.warnings() {
                tracing::warn!("Mesh '{}': {}", entry.id, warning);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[settings]
resolution = 128
output_dir = "baked"

[settings.material]
density = 80.0

[[meshes]]
id = "statue"
path = "statue.obj"
resolution = 256
material = { transparency = 0.9 }

[[meshes]]
id = "leaf"
path = "leaf.glb"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = BakeManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.settings.resolution, 128);
        assert_eq!(manifest.settings.output_dir, PathBuf::from("baked"));
        assert_eq!(manifest.meshes.len(), 2);
        assert_eq!(manifest.meshes[0].id, "statue");
        assert_eq!(manifest.meshes[1].resolution, None);
    }

    #[test]
    fn test_entry_overrides_shared_settings() {
        let manifest = BakeManifest::parse(MANIFEST).unwrap();

        let statue = manifest.settings_for(&manifest.meshes[0]);
        assert_eq!(statue.resolution, 256);
        assert!((statue.material.transparency - 0.9).abs() < f32::EPSILON);
        assert!((statue.material.density - 80.0).abs() < f32::EPSILON);

        let leaf = manifest.settings_for(&manifest.meshes[1]);
        assert_eq!(leaf.resolution, 128);
        assert!((leaf.material.transparency - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let manifest = BakeManifest::parse("").unwrap();
        assert_eq!(manifest.settings, BakeSettings::default());
        assert!(manifest.meshes.is_empty());
    }

    #[test]
    fn test_validate_rejects_missing_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("statue.obj"), "").unwrap();

        let missing = BakeManifest::parse(MANIFEST).unwrap();
        let err = missing.validate(dir.path()).unwrap_err();
        assert!(err.to_string().contains("leaf"));

        let duplicate = BakeManifest::parse(
            r#"
[[meshes]]
id = "statue"
path = "statue.obj"

[[meshes]]
id = "statue"
path = "statue.obj"
"#,
        )
        .unwrap();
        let err = duplicate.validate(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }
}
