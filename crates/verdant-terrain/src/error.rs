//! Terrain-level error type.

use verdant_mesh::StitchError;

use crate::biome::BiomeId;
use crate::biome_map::BiomeMapError;
use crate::heightmap::HeightmapError;

/// Errors returned by terrain generation.
///
/// Everything except [`TerrainError::BiomeMap`] and [`TerrainError::Stitch`] is a
/// configuration problem detected before any chunk is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    #[error("terrain has no biomes")]
    NoBiomes,
    #[error("chunk size {0} must be positive and finite")]
    InvalidChunkSize(f32),
    #[error("chunk resolution {0} must be at least 2")]
    InvalidResolution(usize),
    #[error("biomes per chunk must be at least 1")]
    NoBiomesPerChunk,
    #[error("reference resolution {0} must be positive and finite")]
    InvalidReferenceResolution(f32),
    #[error("biome '{name}' ({id}) has no heightmap")]
    MissingHeightmap { id: BiomeId, name: String },
    #[error("biome '{name}' has invalid frequency weight {weight}")]
    InvalidWeight { name: String, weight: f32 },
    #[error("every biome has a frequency weight of zero")]
    AllWeightsZero,
    #[error("heightmap of biome '{biome}': {source}")]
    Heightmap {
        biome: String,
        #[source]
        source: HeightmapError,
    },
    #[error(transparent)]
    BiomeMap(#[from] BiomeMapError),
    #[error(transparent)]
    Stitch(#[from] StitchError),
}
