//! Procedural terrain generation: stable seeding, heightmaps, Voronoi biome blending,
//! chunk meshing with edge stitching, and deterministic feature scatter.

mod biome_map;
mod chunk;
mod error;
mod scatter;
mod terrain;

pub mod biome;
pub mod heightmap;
pub mod seed;

pub use biome::{
    Biome, BiomeId, BiomeRegistry, Feature, FeatureId, PrefabHandle, SkyboxHandle, TextureHandle,
};
pub use biome_map::{BiomeMap, BiomeMapError, VoronoiSeed, WeightedPicker, dominant_index};
pub use chunk::{Chunk, ChunkContext, ChunkCoord, generate_chunk, stitch_chunks};
pub use error::TerrainError;
pub use heightmap::{
    HeightImage, Heightmap, HeightmapError, HeightmapId, HeightmapLibrary, ImageHeightmap,
};
pub use scatter::{
    DEFAULT_REFERENCE_RESOLUTION, FeaturePlacement, Scatter, density_correction, spawn_probability,
};
pub use seed::{StableHash, StableHasher, chunk_rng, multi_hash, seed_from_string};
pub use terrain::{GenerationStats, Terrain, TerrainConfig};
