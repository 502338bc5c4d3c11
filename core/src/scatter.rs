//! One-bounce light scatter with global energy normalization
//!
//! Base emission comes from the normal map: a texel emits into a hemisphere
//! only with the part of its normal past the mid-point. Each exact texel then
//! gathers emission from its reflections list once, and the whole result is
//! rescaled so the clamped scattered total matches the base total.

use glam::Vec3;
use rayon::prelude::*;

use crate::texel::{NormalMap, TexelGrid};
use crate::transfer::TransferGraph;

/// Which side of the normal a translucency map represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    Positive,
    Negative,
}

impl Hemisphere {
    pub const ALL: [Hemisphere; 2] = [Hemisphere::Positive, Hemisphere::Negative];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Hemisphere::Positive => 0,
            Hemisphere::Negative => 1,
        }
    }
}

/// Emission of a remapped normal into one hemisphere.
///
/// `max(0, c - 0.5) * 2` per channel, where `c` is the color for the positive
/// side and `1 - color` for the negative side.
#[inline]
pub fn adjusted_normal(color: Vec3, hemisphere: Hemisphere) -> Vec3 {
    let c = match hemisphere {
        Hemisphere::Positive => color,
        Hemisphere::Negative => Vec3::ONE - color,
    };
    (c - Vec3::splat(0.5)).max(Vec3::ZERO) * 2.0
}

/// Base emission for every texel and both hemispheres
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionMaps {
    pub positive: TexelGrid<Vec3>,
    pub negative: TexelGrid<Vec3>,
}

impl EmissionMaps {
    pub fn from_normal_map(normal: &NormalMap) -> Self {
        Self {
            positive: normal.map(|c| adjusted_normal(c.truncate(), Hemisphere::Positive)),
            negative: normal.map(|c| adjusted_normal(c.truncate(), Hemisphere::Negative)),
        }
    }

    fn at(&self, index: usize) -> [Vec3; 2] {
        [self.positive.texels()[index], self.negative.texels()[index]]
    }
}

/// Scatter state of one exact texel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexelInfo {
    /// Row-major grid index
    pub index: u32,
    pub x: u32,
    pub y: u32,
    /// Base emission, indexed by [`Hemisphere::index`]
    pub emission: [Vec3; 2],
    /// Scattered intensity, indexed by [`Hemisphere::index`]
    pub intensity: [Vec3; 2],
}

/// Per-hemisphere energy bookkeeping of a scatter pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBalance {
    /// Sum of base emission over exact texels
    pub base_total: [Vec3; 2],
    /// Sum of scattered intensity clamped to [0, 1], before normalization
    pub scattered_total: [Vec3; 2],
    /// Per-channel factor applied to every scattered intensity
    pub factors: [Vec3; 2],
}

/// Result of [`simulate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterResult {
    pub texels: Vec<TexelInfo>,
    pub balance: EnergyBalance,
}

/// Correction factor `base / scattered` per channel.
///
/// Channels that received no scattered energy (or would yield a non-finite
/// factor) fall back to 1.
pub fn normalization_factor(base: Vec3, scattered: Vec3) -> Vec3 {
    let factor = |b: f32, s: f32| {
        if s == 0.0 {
            return 1.0;
        }
        let f = b / s;
        if f.is_finite() { f } else { 1.0 }
    };
    Vec3::new(
        factor(base.x, scattered.x),
        factor(base.y, scattered.y),
        factor(base.z, scattered.z),
    )
}

/// Single discrete gather over the transfer graph.
///
/// For source `i` and hemisphere `v`:
/// `Σ emission[v][j] * weight / source_count` over `(j, weight)` in its reflections.
pub fn scatter(graph: &TransferGraph, emission: &EmissionMaps) -> Vec<[Vec3; 2]> {
    let count = graph.source_count() as f32;
    (0..graph.source_count())
        .into_par_iter()
        .map(|n| {
            let mut incoming = [Vec3::ZERO; 2];
            for r in graph.reflections(n) {
                let [pos, neg] = emission.at(r.target as usize);
                incoming[0] += pos * r.weight;
                incoming[1] += neg * r.weight;
            }
            [incoming[0] / count, incoming[1] / count]
        })
        .collect()
}

/// Run the scatter pass and normalize its energy.
///
/// Sums are accumulated sequentially in source order so repeated runs are
/// bit-identical.
pub fn simulate(graph: &TransferGraph, emission: &EmissionMaps) -> ScatterResult {
    let incoming = scatter(graph, emission);
    let res = emission.positive.resolution();

    let mut base_total = [Vec3::ZERO; 2];
    let mut scattered_total = [Vec3::ZERO; 2];
    let mut texels: Vec<TexelInfo> = graph
        .sources()
        .iter()
        .zip(incoming)
        .map(|(&index, intensity)| {
            let emission = emission.at(index as usize);
            for h in 0..2 {
                base_total[h] += emission[h];
                scattered_total[h] += intensity[h].clamp(Vec3::ZERO, Vec3::ONE);
            }
            TexelInfo {
                index,
                x: index % res as u32,
                y: index / res as u32,
                emission,
                intensity,
            }
        })
        .collect();

    let factors = [
        normalization_factor(base_total[0], scattered_total[0]),
        normalization_factor(base_total[1], scattered_total[1]),
    ];
    for h in Hemisphere::ALL {
        let f = factors[h.index()];
        let fell_back = (0..3).any(|c| scattered_total[h.index()][c] == 0.0);
        if fell_back && !texels.is_empty() {
            tracing::warn!(
                "{:?} hemisphere has channels with no scattered energy, using factor 1 there",
                h
            );
        }
        tracing::debug!("{:?} normalization factor: {:?}", h, f);
    }

    texels.par_iter_mut().for_each(|t| {
        t.intensity[0] *= factors[0];
        t.intensity[1] *= factors[1];
    });

    ScatterResult {
        texels,
        balance: EnergyBalance {
            base_total,
            scattered_total,
            factors,
        },
    }
}
