//! Square texel grids and alpha confidence tiers
//!
//! All baked maps are `resolution × resolution` RGBA grids stored row-major
//! (`index = y * resolution + x`, `y = 0` is the bottom UV row). Alpha is not
//! opacity: it records how a texel's value was produced.

use glam::Vec4;

use crate::error::{BakeError, Result};

/// Alpha written for a direct rasterization hit
pub const ALPHA_EXACT: f32 = 1.0;

/// Alpha written for a texel filled by dilation
pub const ALPHA_FILLED: f32 = 0.5;

/// Texels at or above this alpha take part in light transfer
pub const TRANSFER_ALPHA: f32 = 0.9;

/// Object-space values are stored with this offset so [-0.5, 0.5] lands in [0, 1]
pub const CHANNEL_OFFSET: f32 = 0.5;

/// How a texel's value was produced, derived from its alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// Direct rasterization hit (alpha 1.0)
    Exact,
    /// Copied from a neighbour by dilation (alpha 0.5)
    Filled,
    /// No data (alpha below 0.5)
    Empty,
}

impl Confidence {
    pub fn from_alpha(alpha: f32) -> Self {
        if alpha >= ALPHA_EXACT {
            Self::Exact
        } else if alpha >= ALPHA_FILLED {
            Self::Filled
        } else {
            Self::Empty
        }
    }
}

/// Square row-major grid of texels
#[derive(Debug, Clone, PartialEq)]
pub struct TexelGrid<T = Vec4> {
    resolution: usize,
    texels: Vec<T>,
}

/// Object-space positions, each channel offset by [`CHANNEL_OFFSET`]
pub type PositionMap = TexelGrid<Vec4>;

/// Object-space normals, each channel offset by [`CHANNEL_OFFSET`]
pub type NormalMap = TexelGrid<Vec4>;

impl<T: Copy + Default> TexelGrid<T> {
    /// Create a grid with every texel set to `T::default()`
    pub fn new(resolution: usize) -> Self {
        Self::filled(resolution, T::default())
    }

    pub fn filled(resolution: usize, value: T) -> Self {
        Self {
            resolution,
            texels: vec![value; resolution * resolution],
        }
    }

    /// Wrap existing row-major texel data
    pub fn from_texels(resolution: usize, texels: Vec<T>) -> Result<Self> {
        let expected = resolution * resolution;
        if texels.len() != expected {
            return Err(BakeError::ResolutionMismatch {
                expected: resolution,
                found: (texels.len() as f64).sqrt() as usize,
            });
        }
        Ok(Self { resolution, texels })
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.texels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    /// Row-major index of `(x, y)`
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.resolution + x
    }

    /// Inverse of [`TexelGrid::index`]
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.resolution, index / self.resolution)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.texels[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.texels[idx] = value;
    }

    #[inline]
    pub fn texels(&self) -> &[T] {
        &self.texels
    }

    #[inline]
    pub fn texels_mut(&mut self) -> &mut [T] {
        &mut self.texels
    }

    /// Apply `f` to every texel, producing a grid of the same shape
    pub fn map<U: Copy + Default>(&self, f: impl Fn(T) -> U) -> TexelGrid<U> {
        TexelGrid {
            resolution: self.resolution,
            texels: self.texels.iter().map(|&t| f(t)).collect(),
        }
    }

    /// Combine two grids of the same resolution texel by texel
    pub fn zip_map<U: Copy + Default, V: Copy + Default>(
        &self,
        other: &TexelGrid<U>,
        f: impl Fn(T, U) -> V,
    ) -> TexelGrid<V> {
        debug_assert_eq!(self.resolution, other.resolution);
        TexelGrid {
            resolution: self.resolution,
            texels: self
                .texels
                .iter()
                .zip(&other.texels)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }
}

impl TexelGrid<Vec4> {
    #[inline]
    pub fn alpha(&self, index: usize) -> f32 {
        self.texels[index].w
    }

    #[inline]
    pub fn confidence(&self, index: usize) -> Confidence {
        Confidence::from_alpha(self.alpha(index))
    }

    /// Number of texels in the given tier
    pub fn count(&self, tier: Confidence) -> usize {
        self.texels
            .iter()
            .filter(|t| Confidence::from_alpha(t.w) == tier)
            .count()
    }
}

/// Position/normal pair produced by rasterizing a mesh's UV chart
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSpaceMaps {
    pub position: PositionMap,
    pub normal: NormalMap,
}

impl ObjectSpaceMaps {
    /// Pair two maps, rejecting mismatched shapes
    pub fn new(position: PositionMap, normal: NormalMap) -> Result<Self> {
        if position.resolution() != normal.resolution() {
            return Err(BakeError::ResolutionMismatch {
                expected: position.resolution(),
                found: normal.resolution(),
            });
        }
        Ok(Self { position, normal })
    }

    pub fn resolution(&self) -> usize {
        self.position.resolution()
    }
}

/// Final translucency maps, one per hemisphere variant
#[derive(Debug, Clone, PartialEq)]
pub struct TranslucencyMaps {
    pub positive: TexelGrid<Vec4>,
    pub negative: TexelGrid<Vec4>,
}
