//! Bake orchestration
//!
//! A bake runs the stages in order: object-space rasterization (or reuse of
//! cached maps), transfer graph, scatter with energy normalization, then
//! compositing and seam dilation. Persistence is left to the caller.

use crate::composite::compose;
use crate::config::BakeSettings;
use crate::error::Result;
use crate::mesh::Mesh;
use crate::raster::rasterize;
use crate::scatter::{EmissionMaps, EnergyBalance, simulate};
use crate::texel::{Confidence, ObjectSpaceMaps, TranslucencyMaps};
use crate::transfer::TransferGraph;

/// A mesh together with its cached object-space maps
#[derive(Debug, Clone)]
pub struct BakeTarget {
    /// Used to name persisted textures
    pub name: String,
    /// Geometry in canonical object space
    pub mesh: Mesh,
    /// Maps from a previous bake, reused when the resolution still matches
    pub object_space: Option<ObjectSpaceMaps>,
}

impl BakeTarget {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            object_space: None,
        }
    }

    pub fn with_object_space(mut self, maps: Option<ObjectSpaceMaps>) -> Self {
        self.object_space = maps;
        self
    }
}

/// Summary of one bake
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakeReport {
    /// Resolution after clamping
    pub resolution: usize,
    /// False when cached object-space maps were reused
    pub rasterized: bool,
    /// Largest side of the mesh bounds
    pub max_extent: f32,
    pub exact_texels: usize,
    /// Total entries across all reflections lists
    pub reflection_count: usize,
    pub balance: EnergyBalance,
}

/// Everything a bake produces
#[derive(Debug, Clone, PartialEq)]
pub struct BakeOutput {
    pub object_space: ObjectSpaceMaps,
    pub translucency: TranslucencyMaps,
    pub report: BakeReport,
}

/// Runs bakes with one set of settings
#[derive(Debug, Clone, Default)]
pub struct TranslucencyBaker {
    settings: BakeSettings,
}

impl TranslucencyBaker {
    pub fn new(settings: BakeSettings) -> Self {
        for warning in settings.material.warnings() {
            tracing::warn!("{}", warning);
        }
        Self { settings }
    }

    /// Rasterize the object-space maps unconditionally and cache them on the target.
    pub fn rasterize_only(&self, target: &mut BakeTarget) -> Result<ObjectSpaceMaps> {
        let raster = self.settings.raster_settings();
        tracing::info!(
            "Rasterizing '{}' at {}x{} (multisample {}, spread {})",
            target.name,
            raster.resolution,
            raster.resolution,
            raster.multisample,
            raster.spread
        );
        let maps = rasterize(&target.mesh, &raster)?;
        target.object_space = Some(maps.clone());
        Ok(maps)
    }

    /// Cached maps when they can be reused, fresh ones otherwise.
    ///
    /// Returns the maps and whether rasterization ran.
    fn object_space(&self, target: &mut BakeTarget) -> Result<(ObjectSpaceMaps, bool)> {
        let resolution = self.settings.raster_settings().resolution;
        if let Some(cached) = &target.object_space {
            if cached.resolution() != resolution {
                tracing::info!(
                    "Cached maps for '{}' are {}x{}, rebaking at {}x{}",
                    target.name,
                    cached.resolution(),
                    cached.resolution(),
                    resolution,
                    resolution
                );
            } else if !self.settings.force_rebake {
                tracing::info!("Reusing cached object-space maps for '{}'", target.name);
                return Ok((cached.clone(), false));
            }
        }
        Ok((self.rasterize_only(target)?, true))
    }

    /// Bake object-space and translucency maps for a target.
    ///
    /// Takes the target exclusively so its cached maps cannot be shared by
    /// two bakes at once.
    pub fn bake(&self, target: &mut BakeTarget) -> Result<BakeOutput> {
        let max_extent = target.mesh.max_extent();
        tracing::info!("Baking '{}' (max extent {:.3})", target.name, max_extent);

        let (object_space, rasterized) = self.object_space(target)?;
        let material = &self.settings.material;

        let exact_texels = object_space.position.count(Confidence::Exact);
        if exact_texels == 0 {
            tracing::warn!("'{}' has no exact texels, nothing will scatter", target.name);
        }

        let graph = TransferGraph::build(
            &object_space.position,
            material.density,
            material.depth_cutout,
        );
        let emission = EmissionMaps::from_normal_map(&object_space.normal);
        let scatter = simulate(&graph, &emission);
        tracing::info!(
            "Scattered {} exact texels over {} reflections, factors {:?} / {:?}",
            exact_texels,
            graph.reflection_count(),
            scatter.balance.factors[0],
            scatter.balance.factors[1]
        );

        let translucency = compose(
            &emission,
            &object_space.position,
            &scatter,
            &material.composite_settings(),
        );

        Ok(BakeOutput {
            report: BakeReport {
                resolution: object_space.resolution(),
                rasterized,
                max_extent,
                exact_texels,
                reflection_count: graph.reflection_count(),
                balance: scatter.balance,
            },
            object_space,
            translucency,
        })
    }
}
