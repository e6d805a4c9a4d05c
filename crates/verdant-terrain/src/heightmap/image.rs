//! Heightmap sampled from a tiled grayscale image.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::HeightmapError;

/// Decoded grayscale pixels in `[0, 1]`, row-major with row `z` at `z * width`.
///
/// The core never touches the filesystem; callers decode images and hand the
/// pixels over through [`HeightImage::from_gray`] or [`HeightImage::from_luma8`].
#[derive(Clone, Debug, PartialEq)]
pub struct HeightImage {
    width: u32,
    height: u32,
    pixels: Vec<f32>,
}

impl HeightImage {
    /// Wrap already-normalized grayscale values.
    pub fn from_gray(width: u32, height: u32, pixels: Vec<f32>) -> Result<Self, HeightmapError> {
        let expected = width as usize * height as usize;
        if expected == 0 || pixels.len() != expected {
            return Err(HeightmapError::InvalidImage {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert 8-bit luma samples.
    pub fn from_luma8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, HeightmapError> {
        let pixels = bytes.iter().map(|&b| f32::from(b) / 255.0).collect();
        Self::from_gray(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Grayscale value at integer pixel coordinates, wrapping in both directions.
    pub fn sample_wrapped(&self, x: i64, z: i64) -> f32 {
        let px = x.rem_euclid(i64::from(self.width)) as usize;
        let pz = z.rem_euclid(i64::from(self.height)) as usize;
        self.pixels[pz * self.width as usize + px]
    }
}

/// Image heightmap parameters.
///
/// `source` names the file the host should decode; the decoded pixels are attached
/// at runtime and never serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageHeightmap {
    pub min_height: f32,
    pub max_height: f32,
    /// Pixels per world unit.
    pub texture_scale: f32,
    pub source: Option<PathBuf>,
    #[serde(skip)]
    pub image: Option<HeightImage>,
}

impl Default for ImageHeightmap {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 10.0,
            texture_scale: 1.0,
            source: None,
            image: None,
        }
    }
}

impl ImageHeightmap {
    pub fn with_image(image: HeightImage) -> Self {
        Self {
            image: Some(image),
            ..Default::default()
        }
    }

    /// Pixel under `(x, z)` mapped to `[min_height, max_height]`; the image tiles.
    pub fn get_height(&self, x: f32, z: f32) -> Result<f32, HeightmapError> {
        let image = self.image.as_ref().ok_or(HeightmapError::MissingImage)?;
        // Truncation toward zero, then Euclidean wrap so negative coordinates tile.
        let px = (x * self.texture_scale) as i64;
        let pz = (z * self.texture_scale) as i64;
        let value = image.sample_wrapped(px, pz);
        Ok(self.min_height + (self.max_height - self.min_height) * value)
    }
}
