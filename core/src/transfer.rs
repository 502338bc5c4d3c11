//! All-pairs light transfer graph over the position map
//!
//! Every exact texel is a source. Its reflections list holds every texel it
//! exchanges light with, weighted by normalized object-space distance. Lists
//! are stored back to back in one arena and addressed by per-source offsets.

use glam::Vec3;
use rayon::prelude::*;

use crate::texel::{Confidence, PositionMap, TRANSFER_ALPHA};

/// Diagonal of the unit position cube
const SQRT_3: f32 = 1.732_050_8;

/// Weight a texel contributes to itself
pub const SELF_WEIGHT: f32 = 1.0;

/// One `(neighbour, weight)` entry of a reflections list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflection {
    /// Grid index of the neighbouring texel
    pub target: u32,
    pub weight: f32,
}

/// Distance between two remapped positions, normalized to [0, 1]
#[inline]
pub fn texel_distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b) / SQRT_3
}

/// Distance falloff: `max(0, 1 / (1 + distance * density) - depth_cutout)`
#[inline]
pub fn transfer_weight(distance: f32, density: f32, depth_cutout: f32) -> f32 {
    (1.0 / (1.0 + distance * density) - depth_cutout).max(0.0)
}

/// Reflections of every exact texel, rebuilt from scratch for each bake
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferGraph {
    sources: Vec<u32>,
    offsets: Vec<usize>,
    reflections: Vec<Reflection>,
}

impl TransferGraph {
    /// Build the graph for a position map.
    ///
    /// Targets are texels with alpha of at least 0.9, plus the source itself.
    /// Entries with zero weight are dropped, except the self entry which
    /// always carries [`SELF_WEIGHT`].
    pub fn build(position: &PositionMap, density: f32, depth_cutout: f32) -> Self {
        let texels = position.texels();

        let sources: Vec<u32> = (0..texels.len())
            .filter(|&i| position.confidence(i) == Confidence::Exact)
            .map(|i| i as u32)
            .collect();

        let targets: Vec<(u32, Vec3)> = texels
            .iter()
            .enumerate()
            .filter(|(_, t)| t.w >= TRANSFER_ALPHA)
            .map(|(i, t)| (i as u32, t.truncate()))
            .collect();

        let lists: Vec<Vec<Reflection>> = sources
            .par_iter()
            .map(|&source| {
                let origin = texels[source as usize].truncate();
                targets
                    .iter()
                    .filter_map(|&(target, pos)| {
                        let weight = if target == source {
                            SELF_WEIGHT
                        } else {
                            transfer_weight(texel_distance(origin, pos), density, depth_cutout)
                        };
                        (weight > 0.0 || target == source).then_some(Reflection { target, weight })
                    })
                    .collect()
            })
            .collect();

        let mut offsets = Vec::with_capacity(sources.len() + 1);
        let mut reflections = Vec::with_capacity(lists.iter().map(Vec::len).sum());
        offsets.push(0);
        for list in lists {
            reflections.extend(list);
            offsets.push(reflections.len());
        }

        tracing::debug!(
            "Transfer graph: {} sources, {} targets, {} reflections",
            sources.len(),
            targets.len(),
            reflections.len()
        );

        Self {
            sources,
            offsets,
            reflections,
        }
    }

    /// Number of source (exact) texels
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Grid indices of the source texels, in row-major order
    pub fn sources(&self) -> &[u32] {
        &self.sources
    }

    /// Reflections list of the `n`th source
    pub fn reflections(&self, n: usize) -> &[Reflection] {
        &self.reflections[self.offsets[n]..self.offsets[n + 1]]
    }

    /// Total number of entries across all lists
    pub fn reflection_count(&self) -> usize {
        self.reflections.len()
    }

    /// `(source grid index, reflections)` for every source
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Reflection])> {
        self.sources
            .iter()
            .enumerate()
            .map(|(n, &source)| (source, self.reflections(n)))
    }
}
