//! translucency-core
//!
//! Offline baking of object-space position/normal maps and one-bounce
//! translucency maps for static meshes.
//!
//! The pipeline:
//! - [`raster`] samples the mesh's UV chart into position and normal maps,
//!   then [`dilate`] fills gaps around the chart.
//! - [`transfer`] builds the all-pairs light transfer graph over exact texels.
//! - [`scatter`] runs one bounce of light exchange and normalizes its energy.
//! - [`composite`] blends direct and scattered light and bleeds results
//!   across UV seams.
//!
//! [`TranslucencyBaker`] ties the stages together and [`BakedTextureStore`]
//! persists the results as PNGs.

pub mod bake;
pub mod composite;
pub mod config;
pub mod dilate;
pub mod error;
pub mod mesh;
pub mod raster;
pub mod scatter;
pub mod store;
pub mod texel;
pub mod transfer;

pub use bake::{BakeOutput, BakeReport, BakeTarget, TranslucencyBaker};
pub use config::{BakeSettings, MaterialSettings};
pub use error::{BakeError, Result};
pub use mesh::{Bounds, Mesh};
pub use raster::RasterSettings;
pub use store::{BakedPaths, BakedTextureStore};
pub use texel::{
    Confidence, NormalMap, ObjectSpaceMaps, PositionMap, TexelGrid, TranslucencyMaps,
};
