//! PNG persistence of baked maps
//!
//! Maps are stored as RGBA8 with UV `v = 0` on the bottom image row, so texel
//! row `y` lands on image row `resolution - 1 - y`.

use glam::Vec4;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::{BakeError, Result};
use crate::texel::{ObjectSpaceMaps, TexelGrid, TranslucencyMaps};

const POSITION_SUFFIX: &str = "_ObjSpcPos.png";
const NORMAL_SUFFIX: &str = "_ObjSpcNrm.png";
const POSITIVE_SUFFIX: &str = "_TrnslPosFinal.png";
const NEGATIVE_SUFFIX: &str = "_TrnslNegFinal.png";

/// Directory holding baked textures for any number of targets
#[derive(Debug, Clone)]
pub struct BakedTextureStore {
    dir: PathBuf,
}

/// Paths of the four files written for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakedPaths {
    pub position: PathBuf,
    pub normal: PathBuf,
    pub positive: PathBuf,
    pub negative: PathBuf,
}

impl BakedTextureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self, name: &str) -> BakedPaths {
        let file = |suffix: &str| self.dir.join(format!("{name}{suffix}"));
        BakedPaths {
            position: file(POSITION_SUFFIX),
            normal: file(NORMAL_SUFFIX),
            positive: file(POSITIVE_SUFFIX),
            negative: file(NEGATIVE_SUFFIX),
        }
    }

    pub fn save_object_space(&self, name: &str, maps: &ObjectSpaceMaps) -> Result<BakedPaths> {
        self.ensure_dir()?;
        let paths = self.paths(name);
        write_grid(&maps.position, &paths.position)?;
        write_grid(&maps.normal, &paths.normal)?;
        Ok(paths)
    }

    pub fn save_translucency(&self, name: &str, maps: &TranslucencyMaps) -> Result<BakedPaths> {
        self.ensure_dir()?;
        let paths = self.paths(name);
        write_grid(&maps.positive, &paths.positive)?;
        write_grid(&maps.negative, &paths.negative)?;
        Ok(paths)
    }

    /// Read previously saved position and normal maps.
    ///
    /// Returns `Ok(None)` when either file is missing, or when the pair is not
    /// two square images of the same size, so the caller rasterizes afresh.
    pub fn load_object_space(&self, name: &str) -> Result<Option<ObjectSpaceMaps>> {
        let paths = self.paths(name);
        if !paths.position.is_file() || !paths.normal.is_file() {
            return Ok(None);
        }
        let position = read_image(&paths.position)?;
        let normal = read_image(&paths.normal)?;
        let (width, height) = position.dimensions();
        if width != height || normal.dimensions() != (width, height) {
            tracing::warn!(
                "Cached maps for '{}' are {}x{} and {}x{}, ignoring them",
                name,
                width,
                height,
                normal.width(),
                normal.height()
            );
            return Ok(None);
        }
        ObjectSpaceMaps::new(from_image(&position)?, from_image(&normal)?).map(Some)
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| BakeError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}

/// Clamp to [0, 1] and round to 8 bits
#[inline]
pub fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn dequantize(value: u8) -> f32 {
    f32::from(value) / 255.0
}

/// Encode a grid as an RGBA8 image, bottom texel row last
pub fn to_image(grid: &TexelGrid<Vec4>) -> RgbaImage {
    let res = grid.resolution() as u32;
    RgbaImage::from_fn(res, res, |x, row| {
        let texel = grid.get(x as usize, (res - 1 - row) as usize);
        Rgba(texel.to_array().map(quantize))
    })
}

/// Decode an RGBA8 image back into a grid
pub fn from_image(image: &RgbaImage) -> Result<TexelGrid<Vec4>> {
    let (width, height) = image.dimensions();
    if width != height {
        return Err(BakeError::ResolutionMismatch {
            expected: width as usize,
            found: height as usize,
        });
    }
    let res = width as usize;
    let mut grid = TexelGrid::new(res);
    for (x, row, pixel) in image.enumerate_pixels() {
        grid.set(
            x as usize,
            res - 1 - row as usize,
            Vec4::from_array(pixel.0.map(dequantize)),
        );
    }
    Ok(grid)
}

fn image_error(path: &Path) -> impl FnOnce(image::ImageError) -> BakeError {
    let path = path.to_path_buf();
    move |source| BakeError::Image { path, source }
}

fn write_grid(grid: &TexelGrid<Vec4>, path: &Path) -> Result<()> {
    to_image(grid).save(path).map_err(image_error(path))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

fn read_image(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path).map_err(image_error(path))?.to_rgba8())
}
