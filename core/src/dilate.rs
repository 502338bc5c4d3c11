//! Gap-filling dilation ("spread")
//!
//! Each iteration reads a snapshot of the grid as it was when the iteration
//! began, so fill advances exactly one texel ring per iteration.

use glam::Vec4;
use rayon::prelude::*;

use crate::texel::{ALPHA_FILLED, TexelGrid};

/// 8-connected neighbourhood in scan order (column offset outer, row offset inner)
pub(crate) const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Fill empty texels from their neighbours, `iterations` times.
///
/// An empty texel (alpha < 0.5) takes the RGB of the first neighbour in scan
/// order whose alpha is at least 0.5, with alpha set to exactly 0.5. Texels at
/// or above 0.5 are never modified. Neighbours outside the grid are skipped.
pub fn dilate(grid: &TexelGrid<Vec4>, iterations: usize) -> TexelGrid<Vec4> {
    let mut current = grid.clone();
    for _ in 0..iterations {
        let (next, filled) = dilate_once(&current);
        current = next;
        if filled == 0 {
            break;
        }
    }
    current
}

/// One dilation pass; returns the new grid and the number of texels filled
fn dilate_once(source: &TexelGrid<Vec4>) -> (TexelGrid<Vec4>, usize) {
    let res = source.resolution();
    let mut next = source.clone();

    let filled: usize = next
        .texels_mut()
        .par_chunks_exact_mut(res)
        .enumerate()
        .map(|(y, row)| {
            let mut filled = 0;
            for (x, texel) in row.iter_mut().enumerate() {
                if texel.w >= ALPHA_FILLED {
                    continue;
                }
                if let Some(rgb) = first_filled_neighbour(source, x, y) {
                    *texel = rgb.extend(ALPHA_FILLED);
                    filled += 1;
                }
            }
            filled
        })
        .sum();

    (next, filled)
}

fn first_filled_neighbour(grid: &TexelGrid<Vec4>, x: usize, y: usize) -> Option<glam::Vec3> {
    let res = grid.resolution() as isize;
    NEIGHBOURS.iter().find_map(|&(dx, dy)| {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 || nx >= res || ny >= res {
            return None;
        }
        let texel = grid.get(nx as usize, ny as usize);
        (texel.w >= ALPHA_FILLED).then(|| texel.truncate())
    })
}
