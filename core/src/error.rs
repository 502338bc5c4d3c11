//! Error types for baking

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BakeError>;

/// Errors surfaced by a bake invocation.
///
/// Every failure is terminal for the bake that produced it. Nothing is retried.
#[derive(Error, Debug)]
pub enum BakeError {
    #[error("mesh has no vertices")]
    EmptyMesh,

    #[error("mesh has no triangles")]
    NoTriangles,

    #[error("mesh has no UV coordinates")]
    MissingUvs,

    #[error("mesh has no vertex normals")]
    MissingNormals,

    #[error("mesh has {found} {attribute} but {expected} vertices")]
    AttributeMismatch {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("triangle {triangle} references vertex {index}, mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("texel grid is {found}x{found}, expected {expected}x{expected}")]
    ResolutionMismatch { expected: usize, found: usize },

    #[error("image error in {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BakeError {
    /// Whether this error reports unusable mesh data
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyMesh
                | Self::NoTriangles
                | Self::MissingUvs
                | Self::MissingNormals
                | Self::AttributeMismatch { .. }
                | Self::IndexOutOfRange { .. }
        )
    }
}
