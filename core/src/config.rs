//! Bake configuration
//!
//! Settings are plain serde structs so they can be embedded in a TOML bake
//! manifest. Integer fields are signed: out-of-range values still parse and
//! are clamped when converted to [`RasterSettings`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::composite::CompositeSettings;
use crate::raster::RasterSettings;

/// Everything one bake needs besides the mesh itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeSettings {
    /// Map width and height in texels (default: 64, minimum: 32)
    #[serde(default = "default_resolution")]
    pub resolution: i32,
    /// Sub-samples per texel axis (default: 1, minimum: 1)
    #[serde(default = "default_multisample")]
    pub multisample: i32,
    /// Dilation iterations applied to the object-space maps (default: 1)
    #[serde(default = "default_spread")]
    pub spread: i32,
    /// Rasterize even when cached object-space maps match the resolution
    #[serde(default)]
    pub force_rebake: bool,
    /// Write the four PNGs after baking (default: true)
    #[serde(default = "default_true")]
    pub save_to_disk: bool,
    /// Directory the PNGs are written to (default: Textures/Baked)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub material: MaterialSettings,
}

/// Translucency material parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSettings {
    /// Share of scattered vs direct light (default: 0.95, range: 0.0-1.0)
    #[serde(default = "default_transparency")]
    pub transparency: f32,
    /// Gain on the scattered term (default: 1.0)
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    /// Distance falloff steepness (default: 100.0, expected > 0)
    #[serde(default = "default_density")]
    pub density: f32,
    /// Weight subtracted from every transfer weight (default: 0.1)
    #[serde(default = "default_depth_cutout")]
    pub depth_cutout: f32,
    /// Per-channel multiplier on scattered texels (default: white)
    #[serde(default = "default_tint")]
    pub tint: [f32; 3],
}

fn default_resolution() -> i32 {
    64
}
fn default_multisample() -> i32 {
    1
}
fn default_spread() -> i32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("Textures/Baked")
}

fn default_transparency() -> f32 {
    0.95
}
fn default_intensity() -> f32 {
    1.0
}
fn default_density() -> f32 {
    100.0
}
fn default_depth_cutout() -> f32 {
    0.1
}
fn default_tint() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            multisample: default_multisample(),
            spread: default_spread(),
            force_rebake: false,
            save_to_disk: default_true(),
            output_dir: default_output_dir(),
            material: MaterialSettings::default(),
        }
    }
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            transparency: default_transparency(),
            intensity: default_intensity(),
            density: default_density(),
            depth_cutout: default_depth_cutout(),
            tint: default_tint(),
        }
    }
}

impl BakeSettings {
    /// Rasterization parameters with every value raised to its minimum
    pub fn raster_settings(&self) -> RasterSettings {
        RasterSettings::clamped(
            self.resolution.into(),
            self.multisample.into(),
            self.spread.into(),
        )
    }
}

impl MaterialSettings {
    pub fn composite_settings(&self) -> CompositeSettings {
        CompositeSettings {
            transparency: self.transparency,
            intensity: self.intensity,
            tint: Vec3::from_array(self.tint),
        }
    }

    /// Human-readable warnings about values that bake but are probably wrong.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.density <= 0.0 {
            warnings.push(format!(
                "density {} is not positive, transfer weights will not fall off with distance",
                self.density
            ));
        }
        if !(0.0..=1.0).contains(&self.transparency) {
            warnings.push(format!(
                "transparency {} is outside 0.0-1.0",
                self.transparency
            ));
        }
        warnings
    }
}
