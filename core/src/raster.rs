//! UV-chart rasterization into object-space position and normal maps

use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::*;

use crate::dilate::dilate;
use crate::error::Result;
use crate::mesh::{ChartTriangle, Mesh};
use crate::texel::{ALPHA_EXACT, CHANNEL_OFFSET, ObjectSpaceMaps, TexelGrid};

/// Smallest supported map resolution
pub const MIN_RESOLUTION: usize = 32;

/// Smallest supported samples per texel axis
pub const MIN_MULTISAMPLE: usize = 1;

/// Slack applied to UV bounding boxes when culling triangles per sample
const CULL_EPSILON: f32 = 1e-5;

/// Clamped rasterization parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSettings {
    /// Map width and height in texels (at least 32)
    pub resolution: usize,
    /// Sub-samples per texel axis; each texel takes `multisample²` samples
    pub multisample: usize,
    /// Dilation iterations applied to both maps
    pub spread: usize,
}

impl RasterSettings {
    /// Build settings from raw, possibly out-of-range values.
    ///
    /// Values below their minimum are raised to it, never rejected.
    pub fn clamped(resolution: i64, multisample: i64, spread: i64) -> Self {
        Self {
            resolution: resolution.max(MIN_RESOLUTION as i64) as usize,
            multisample: multisample.max(MIN_MULTISAMPLE as i64) as usize,
            spread: spread.max(0) as usize,
        }
    }
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self::clamped(64, 1, 1)
    }
}

/// Barycentric weights of `p` in the UV triangle `tri`.
///
/// Returns `None` for triangles with zero UV area.
pub fn barycentric(tri: [Vec2; 3], p: Vec2) -> Option<Vec3> {
    let [v1, v2, v3] = tri;
    let d1 = (v2.y - v3.y) * (v1.x - v3.x) + (v3.x - v2.x) * (v1.y - v3.y);
    let d2 = (v3.y - v1.y) * (v2.x - v3.x) + (v1.x - v3.x) * (v2.y - v3.y);
    if d1 == 0.0 || d2 == 0.0 {
        return None;
    }

    let b1 = ((v2.y - v3.y) * (p.x - v3.x) + (v3.x - v2.x) * (p.y - v3.y)) / d1;
    let b2 = ((v3.y - v1.y) * (p.x - v3.x) + (v1.x - v3.x) * (p.y - v3.y)) / d2;
    Some(Vec3::new(b1, b2, 1.0 - b1 - b2))
}

/// Inside test on barycentric weights.
///
/// The third weight has no upper bound check: with the first two in [0, 1]
/// and non-negative, `1 - b1 - b2` cannot exceed 1.
#[inline]
pub fn in_triangle(b: Vec3) -> bool {
    (0.0..=1.0).contains(&b.x) && (0.0..=1.0).contains(&b.y) && b.z >= 0.0
}

/// Triangle with a precomputed UV bounding box for culling
struct Candidate {
    tri: ChartTriangle,
    min: Vec2,
    max: Vec2,
}

impl Candidate {
    fn new(tri: ChartTriangle) -> Self {
        let [a, b, c] = tri.uv;
        Self {
            tri,
            min: a.min(b).min(c) - Vec2::splat(CULL_EPSILON),
            max: a.max(b).max(c) + Vec2::splat(CULL_EPSILON),
        }
    }

    /// Interpolated (position, normal) at `p`, range-remapped, if `p` is inside
    fn sample(&self, p: Vec2) -> Option<(Vec3, Vec3)> {
        if p.cmplt(self.min).any() || p.cmpgt(self.max).any() {
            return None;
        }
        let b = barycentric(self.tri.uv, p)?;
        if !in_triangle(b) {
            return None;
        }
        let [pa, pb, pc] = self.tri.positions;
        let [na, nb, nc] = self.tri.normals;
        let offset = Vec3::splat(CHANNEL_OFFSET);
        Some((
            pa * b.x + pb * b.y + pc * b.z + offset,
            na * b.x + nb * b.y + nc * b.z + offset,
        ))
    }
}

/// Rasterize a mesh's UV chart into object-space position and normal maps.
///
/// Every texel takes `multisample²` samples at sub-cell centres. Each sample
/// is resolved by the first triangle (in submission order) containing it;
/// overlapping charts are not disambiguated. Texels with at least one hit get
/// the average of their hits with alpha 1.0, others stay empty until the
/// `spread` dilation passes run.
pub fn rasterize(mesh: &Mesh, settings: &RasterSettings) -> Result<ObjectSpaceMaps> {
    mesh.validate()?;

    let res = settings.resolution;
    let ms = settings.multisample;
    let candidates: Vec<Candidate> = mesh.chart().into_iter().map(Candidate::new).collect();

    let texels: Vec<(Vec4, Vec4)> = (0..res * res)
        .into_par_iter()
        .map(|index| rasterize_texel(&candidates, index % res, index / res, res, ms))
        .collect();

    let (position, normal): (Vec<Vec4>, Vec<Vec4>) = texels.into_iter().unzip();
    let position = TexelGrid::from_texels(res, position)?;
    let normal = TexelGrid::from_texels(res, normal)?;

    let hits = position.texels().iter().filter(|t| t.w >= ALPHA_EXACT).count();
    tracing::debug!(
        "Rasterized {} triangles at {}x{} ({}x{} samples): {} texels hit",
        candidates.len(),
        res,
        res,
        ms,
        ms,
        hits
    );

    ObjectSpaceMaps::new(
        dilate(&position, settings.spread),
        dilate(&normal, settings.spread),
    )
}

fn rasterize_texel(
    candidates: &[Candidate],
    x: usize,
    y: usize,
    res: usize,
    ms: usize,
) -> (Vec4, Vec4) {
    let size = (res * ms) as f32;
    let half = 1.0 / (size * 2.0);

    let mut position_sum = Vec3::ZERO;
    let mut normal_sum = Vec3::ZERO;
    let mut hits = 0u32;

    for sy in 0..ms {
        for sx in 0..ms {
            let p = Vec2::new(
                (x * ms + sx) as f32 / size + half,
                (y * ms + sy) as f32 / size + half,
            );
            if let Some((pos, nrm)) = candidates.iter().find_map(|c| c.sample(p)) {
                position_sum += pos;
                normal_sum += nrm;
                hits += 1;
            }
        }
    }

    if hits == 0 {
        return (Vec4::ZERO, Vec4::ZERO);
    }

    // Stored as unit-range color, like the PNGs they are persisted to
    let n = hits as f32;
    (
        (position_sum / n).clamp(Vec3::ZERO, Vec3::ONE).extend(ALPHA_EXACT),
        (normal_sum / n).clamp(Vec3::ZERO, Vec3::ONE).extend(ALPHA_EXACT),
    )
}
