//! Final translucency compositing and seam dilation

use glam::{Vec3, Vec4};
use rayon::prelude::*;

use crate::dilate::NEIGHBOURS;
use crate::scatter::{EmissionMaps, ScatterResult};
use crate::texel::{
    ALPHA_EXACT, ALPHA_FILLED, PositionMap, TRANSFER_ALPHA, TexelGrid, TranslucencyMaps,
};

/// Material parameters applied when compositing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeSettings {
    /// Share of scattered light vs direct emission, expected in [0, 1]
    pub transparency: f32,
    /// Overall gain on the scattered term
    pub intensity: f32,
    /// Per-channel multiplier on composited texels
    pub tint: Vec3,
}

impl Default for CompositeSettings {
    fn default() -> Self {
        Self {
            transparency: 0.95,
            intensity: 1.0,
            tint: Vec3::ONE,
        }
    }
}

/// Direct term for every texel: `emission * (1 - transparency)`.
///
/// Alpha is carried over from the position map.
pub fn base_maps(
    emission: &EmissionMaps,
    position: &PositionMap,
    transparency: f32,
) -> TranslucencyMaps {
    let direct = 1.0 - transparency;
    let build =
        |grid: &TexelGrid<Vec3>| grid.zip_map(position, |e, p| (e * direct).extend(p.w));
    TranslucencyMaps {
        positive: build(&emission.positive),
        negative: build(&emission.negative),
    }
}

/// Add the normalized scattered term to every exact texel.
///
/// `(base + intensity * transparency * gain) * tint`, saturated to [0, 1]
/// with alpha 1.
pub fn composite(
    base: &TranslucencyMaps,
    scatter: &ScatterResult,
    settings: &CompositeSettings,
) -> TranslucencyMaps {
    let mut out = base.clone();
    let scale = settings.transparency * settings.intensity;
    for texel in &scatter.texels {
        let i = texel.index as usize;
        for (grid, intensity) in [
            (&mut out.positive, texel.intensity[0]),
            (&mut out.negative, texel.intensity[1]),
        ] {
            let slot = &mut grid.texels_mut()[i];
            let rgb = (slot.truncate() + intensity * scale) * settings.tint;
            *slot = rgb.clamp(Vec3::ZERO, Vec3::ONE).extend(ALPHA_EXACT);
        }
    }
    out
}

/// Wrap a neighbour coordinate for seam dilation.
///
/// `-1` wraps to the far edge and `res` wraps to 0, but index 0 is then
/// rejected by the bounds check, so only the low edge actually wraps and the
/// first row and column are never read as neighbours.
#[inline]
fn seam_coord(coord: isize, res: isize) -> Option<usize> {
    let wrapped = if coord == -1 {
        res - 1
    } else if coord == res {
        0
    } else {
        coord
    };
    (wrapped > 0 && wrapped < res).then_some(wrapped as usize)
}

/// Brightest (largest `r + g + b`) confidently mapped neighbour, first wins ties
fn brightest_neighbour(
    grid: &TexelGrid<Vec4>,
    position: &PositionMap,
    x: usize,
    y: usize,
) -> Option<Vec3> {
    let res = grid.resolution() as isize;
    let mut best: Option<Vec3> = None;
    for &(dx, dy) in &NEIGHBOURS {
        let (Some(nx), Some(ny)) = (
            seam_coord(x as isize + dx, res),
            seam_coord(y as isize + dy, res),
        ) else {
            continue;
        };
        if position.get(nx, ny).w <= TRANSFER_ALPHA {
            continue;
        }
        let rgb = grid.get(nx, ny).truncate();
        if best.is_none_or(|b| rgb.element_sum() > b.element_sum()) {
            best = Some(rgb);
        }
    }
    best
}

/// Bleed baked texels across UV seams.
///
/// Every texel whose position alpha is below 0.9 takes, independently per
/// map, the brightest neighbour with position alpha above 0.9, with alpha
/// 0.5. Texels with no such neighbour are cleared to transparent black.
pub fn seam_dilate(maps: &TranslucencyMaps, position: &PositionMap) -> TranslucencyMaps {
    let res = position.resolution();
    let mut out = maps.clone();

    out.positive
        .texels_mut()
        .par_chunks_exact_mut(res)
        .zip(out.negative.texels_mut().par_chunks_exact_mut(res))
        .enumerate()
        .for_each(|(y, (pos_row, neg_row))| {
            for x in 0..res {
                if position.get(x, y).w >= TRANSFER_ALPHA {
                    continue;
                }
                pos_row[x] = brightest_neighbour(&maps.positive, position, x, y)
                    .map_or(Vec4::ZERO, |rgb| rgb.extend(ALPHA_FILLED));
                neg_row[x] = brightest_neighbour(&maps.negative, position, x, y)
                    .map_or(Vec4::ZERO, |rgb| rgb.extend(ALPHA_FILLED));
            }
        });

    out
}

/// Base term, scattered term, then seam dilation
pub fn compose(
    emission: &EmissionMaps,
    position: &PositionMap,
    scatter: &ScatterResult,
    settings: &CompositeSettings,
) -> TranslucencyMaps {
    let base = base_maps(emission, position, settings.transparency);
    let lit = composite(&base, scatter, settings);
    seam_dilate(&lit, position)
}
