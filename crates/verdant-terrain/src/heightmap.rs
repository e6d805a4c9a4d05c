//! Height functions: the building blocks biomes blend into terrain.
//!
//! Each variant of [`Heightmap`] is a pure `(x, z) -> height` function that may
//! carry a seed-dependent offset. Heightmaps live in a [`HeightmapLibrary`] and are
//! addressed by [`HeightmapId`], which lets a [`MultiHeightmap`] sum other entries
//! without owning them.

mod image;
mod lattice;
mod library;
mod perlin;
mod simplex;

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::seed::{det_cos, det_sin};

pub use image::{HeightImage, ImageHeightmap};
pub use library::{HeightmapEntry, HeightmapLibrary};
pub use perlin::PerlinHeightmap;
pub use simplex::SimplexHeightmap;

/// Stable identifier of a heightmap inside a [`HeightmapLibrary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeightmapId(pub u32);

impl fmt::Display for HeightmapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised while evaluating or configuring heightmaps.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeightmapError {
    #[error("image heightmap has no image assigned")]
    MissingImage,
    #[error("invalid image: {width}x{height} with {len} pixels")]
    InvalidImage { width: u32, height: u32, len: usize },
    #[error("multi heightmap {0} contains itself")]
    SelfReference(HeightmapId),
    #[error("unknown heightmap {0}")]
    UnknownId(HeightmapId),
    #[error("heightmap {0} is not an image heightmap")]
    NotAnImage(HeightmapId),
    /// A multi heightmap only references children; it has to be evaluated through
    /// the library that owns them.
    #[error("multi heightmap evaluated outside its library")]
    DetachedMulti,
}

/// Constant height.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatHeightmap {
    pub height: f32,
}

/// `amplitude * sin(x / scale) * sin(z / scale)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinusoidalHeightmap {
    pub amplitude: f32,
    pub scale: f32,
}

impl Default for SinusoidalHeightmap {
    fn default() -> Self {
        Self {
            amplitude: 10.0,
            scale: 10.0,
        }
    }
}

impl SinusoidalHeightmap {
    pub fn get_height(&self, x: f32, z: f32) -> f32 {
        self.amplitude * det_sin(x / self.scale) * det_sin(z / self.scale)
    }

    /// Analytic surface normal `normalize(-dh/dx, 1, -dh/dz)`.
    pub fn normal(&self, x: f32, z: f32) -> Vec3 {
        let (sx, sz) = (x / self.scale, z / self.scale);
        let k = self.amplitude / self.scale;
        let dh_dx = k * det_cos(sx) * det_sin(sz);
        let dh_dz = k * det_sin(sx) * det_cos(sz);
        Vec3::new(-dh_dx, 1.0, -dh_dz).normalize()
    }
}

/// Sum of other heightmaps, evaluated in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiHeightmap {
    pub children: Vec<HeightmapId>,
}

impl MultiHeightmap {
    pub fn new(children: impl IntoIterator<Item = HeightmapId>) -> Self {
        Self {
            children: children.into_iter().collect(),
        }
    }
}

/// A height function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Heightmap {
    Flat(FlatHeightmap),
    Sinusoidal(SinusoidalHeightmap),
    Perlin(PerlinHeightmap),
    Simplex(SimplexHeightmap),
    Image(ImageHeightmap),
    Multi(MultiHeightmap),
}

impl Default for Heightmap {
    fn default() -> Self {
        Self::Flat(FlatHeightmap::default())
    }
}

impl Heightmap {
    pub fn flat(height: f32) -> Self {
        Self::Flat(FlatHeightmap { height })
    }

    pub fn sinusoidal(amplitude: f32, scale: f32) -> Self {
        Self::Sinusoidal(SinusoidalHeightmap { amplitude, scale })
    }

    pub fn perlin(amplitude: f32, scale: f32) -> Self {
        Self::Perlin(PerlinHeightmap::new(amplitude, scale))
    }

    pub fn simplex(amplitude: f32, scale: f32) -> Self {
        Self::Simplex(SimplexHeightmap::new(amplitude, scale))
    }

    pub fn multi(children: impl IntoIterator<Item = HeightmapId>) -> Self {
        Self::Multi(MultiHeightmap::new(children))
    }

    /// Short lowercase name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Flat(_) => "flat",
            Self::Sinusoidal(_) => "sinusoidal",
            Self::Perlin(_) => "perlin",
            Self::Simplex(_) => "simplex",
            Self::Image(_) => "image",
            Self::Multi(_) => "multi",
        }
    }

    /// Reseed this heightmap. Flat, sinusoidal and image heightmaps ignore the seed;
    /// multi heightmaps are reseeded through [`HeightmapLibrary::set_seed`].
    pub fn set_seed(&mut self, seed: i32) {
        match self {
            Self::Perlin(p) => p.set_seed(seed),
            Self::Simplex(s) => s.set_seed(seed),
            Self::Flat(_) | Self::Sinusoidal(_) | Self::Image(_) | Self::Multi(_) => {}
        }
    }

    /// Height of a single, non-composite heightmap.
    pub fn get_height(&self, x: f32, z: f32) -> Result<f32, HeightmapError> {
        match self {
            Self::Flat(f) => Ok(f.height),
            Self::Sinusoidal(s) => Ok(s.get_height(x, z)),
            Self::Perlin(p) => Ok(p.get_height(x, z)),
            Self::Simplex(s) => Ok(s.get_height(x, z)),
            Self::Image(i) => i.get_height(x, z),
            Self::Multi(_) => Err(HeightmapError::DetachedMulti),
        }
    }
}
