//! translucency-export library
//!
//! Mesh import, bake manifests and bake jobs behind the `translucency-export`
//! binary.

pub mod export;
pub mod manifest;
pub mod mesh;

pub use export::{BakeSummary, bake_file, build_all, default_name, rasterize_file};
pub use manifest::BakeManifest;
pub use mesh::load_mesh;
