//! Terrain configuration and the generation pipeline that ties everything together.
//!
//! A run validates the configuration, builds every chunk of the grid (optionally on a
//! worker pool), stitches shared edges and finally scatters features. Nothing is
//! replaced until the whole run has succeeded.

use std::time::{Duration, Instant};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::biome::{Biome, BiomeRegistry, Feature, PrefabHandle, SkyboxHandle, TextureHandle};
use crate::chunk::{Chunk, ChunkContext, ChunkCoord, generate_chunk, stitch_chunks};
use crate::error::TerrainError;
use crate::heightmap::{Heightmap, HeightmapId, HeightmapLibrary};
use crate::scatter::{DEFAULT_REFERENCE_RESOLUTION, FeaturePlacement, Scatter};
use crate::seed::seed_from_string;

/// Everything that defines a terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World seed string; empty picks a fresh time-based seed each run.
    pub world_seed: String,
    /// Seed string for feature scatter, independent of the world seed.
    pub feature_seed: String,
    /// Edge length of a chunk in world units.
    pub chunk_size: f32,
    /// Vertices per chunk edge.
    pub chunk_resolution: usize,
    /// Voronoi seeds per chunk cell.
    pub biomes_per_chunk: usize,
    /// Chunks generated in each direction from the origin chunk.
    pub grid_radius: u32,
    /// Resolution at which feature frequencies are calibrated.
    pub reference_resolution: f32,
    /// Generate chunk meshes on a worker pool.
    pub parallel: bool,
    pub biomes: BiomeRegistry,
    pub heightmaps: HeightmapLibrary,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            world_seed: String::from("verdant"),
            feature_seed: String::from("verdant-features"),
            chunk_size: 100.0,
            chunk_resolution: 100,
            biomes_per_chunk: 3,
            grid_radius: 1,
            reference_resolution: DEFAULT_REFERENCE_RESOLUTION,
            parallel: false,
            biomes: BiomeRegistry::new(),
            heightmaps: HeightmapLibrary::new(),
        }
    }
}

impl TerrainConfig {
    /// A small three-biome world: grassland, desert and mountains.
    pub fn sample_world() -> Self {
        let mut heightmaps = HeightmapLibrary::new();
        let hills = heightmaps.add("rolling hills", Heightmap::perlin(25.0, 60.0));
        let dunes = heightmaps.add("dunes", Heightmap::sinusoidal(4.0, 12.0));
        let ridges = heightmaps.add("ridges", Heightmap::simplex(90.0, 140.0));
        let crags = heightmaps.add("crags", Heightmap::perlin(12.0, 15.0));
        let peaks = heightmaps.add("peaks", Heightmap::multi([ridges, crags]));

        let mut biomes = BiomeRegistry::new();
        biomes.add(
            Biome::new("Grassland")
                .with_heightmap(hills)
                .with_texture(TextureHandle::new("textures/grass"))
                .with_skybox(SkyboxHandle::new("skyboxes/clear"))
                .with_weight(100.0)
                .with_feature(Feature::new("Oak", 60).with_prefab(PrefabHandle::new("prefabs/oak")))
                .with_feature(Feature::new("Stone", 20).with_prefab(PrefabHandle::new("prefabs/stone"))),
        );
        biomes.add(
            Biome::new("Desert")
                .with_heightmap(dunes)
                .with_texture(TextureHandle::new("textures/sand"))
                .with_skybox(SkyboxHandle::new("skyboxes/haze"))
                .with_weight(60.0)
                .with_feature(
                    Feature::new("Cactus", 40)
                        .with_prefab(PrefabHandle::new("prefabs/cactus"))
                        .with_scale(Vec3::new(1.0, 1.5, 1.0)),
                ),
        );
        biomes.add(
            Biome::new("Mountains")
                .with_heightmap(peaks)
                .with_texture(TextureHandle::new("textures/rock"))
                .with_skybox(SkyboxHandle::new("skyboxes/overcast"))
                .with_weight(40.0)
                .with_feature(
                    Feature::new("Boulder", 50)
                        .with_prefab(PrefabHandle::new("prefabs/boulder"))
                        .aligned_to_normal(),
                ),
        );

        Self {
            biomes,
            heightmaps,
            ..Default::default()
        }
    }

    /// Check the configuration without generating anything.
    pub fn validate(&self) -> Result<(), TerrainError> {
        self.check().map(|_| ())
    }

    /// Validates and returns the heightmap of each biome, in biome-index order.
    fn check(&self) -> Result<Vec<HeightmapId>, TerrainError> {
        if self.biomes.is_empty() {
            return Err(TerrainError::NoBiomes);
        }
        if !self.chunk_size.is_finite() || self.chunk_size <= 0.0 {
            return Err(TerrainError::InvalidChunkSize(self.chunk_size));
        }
        if self.chunk_resolution < 2 {
            return Err(TerrainError::InvalidResolution(self.chunk_resolution));
        }
        if self.biomes_per_chunk == 0 {
            return Err(TerrainError::NoBiomesPerChunk);
        }
        if !self.reference_resolution.is_finite() || self.reference_resolution <= 0.0 {
            return Err(TerrainError::InvalidReferenceResolution(self.reference_resolution));
        }

        let mut heightmaps = Vec::with_capacity(self.biomes.len());
        for biome in self.biomes.iter() {
            let weight = biome.frequency_weight;
            if !weight.is_finite() || weight < 0.0 {
                return Err(TerrainError::InvalidWeight {
                    name: biome.name.clone(),
                    weight,
                });
            }
            let Some(id) = biome.heightmap() else {
                return Err(TerrainError::MissingHeightmap {
                    id: biome.id(),
                    name: biome.name.clone(),
                });
            };
            self.heightmaps
                .validate(id)
                .map_err(|source| TerrainError::Heightmap {
                    biome: biome.name.clone(),
                    source,
                })?;
            heightmaps.push(id);
        }
        if self.biomes.iter().all(|b| b.frequency_weight == 0.0) {
            return Err(TerrainError::AllWeightsZero);
        }
        Ok(heightmaps)
    }

    /// Validate and resolve seeds into everything chunk generation needs.
    fn prepare(&self, world_seed: i32) -> Result<ChunkContext, TerrainError> {
        let heightmaps = self.check()?;

        // Each biome root reseeds its subtree; a heightmap shared by several roots
        // keeps the seed of the last one.
        let mut library = self.heightmaps.clone();
        for (biome, &id) in self.biomes.iter().zip(&heightmaps) {
            library
                .set_seed(id, crate::multi_hash!(world_seed, id.0, "heightmap"))
                .map_err(|source| TerrainError::Heightmap {
                    biome: biome.name.clone(),
                    source,
                })?;
        }

        Ok(ChunkContext {
            world_seed,
            chunk_size: self.chunk_size,
            resolution: self.chunk_resolution,
            biomes_per_chunk: self.biomes_per_chunk,
            weights: self.biomes.weights(),
            heightmaps,
            library,
        })
    }
}

/// Summary of the last generation run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GenerationStats {
    pub world_seed: i32,
    pub feature_seed: i32,
    pub chunks: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub placements: usize,
    pub elapsed: Duration,
}

/// Generated terrain: chunks, feature placements and the biomes they refer to.
#[derive(Debug, Default)]
pub struct Terrain {
    chunks: Vec<Chunk>,
    placements: Vec<FeaturePlacement>,
    /// Biomes as they were when the chunks were generated, in biome-index order.
    biomes: Vec<Biome>,
    chunk_size: f32,
    stats: GenerationStats,
}

impl Terrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the chunk grid described by `config`, replacing any previous result.
    ///
    /// On error the previous chunks and placements are left untouched.
    pub fn generate(&mut self, config: &TerrainConfig) -> Result<&GenerationStats, TerrainError> {
        let started = Instant::now();
        let world_seed = seed_from_string(&config.world_seed);
        let feature_seed = seed_from_string(&config.feature_seed);
        let ctx = config.prepare(world_seed)?;

        let coords = ChunkCoord::grid(config.grid_radius);
        log::info!(
            "Generating {} chunks ({}x{} vertices, {} biomes, world seed {world_seed})",
            coords.len(),
            ctx.resolution,
            ctx.resolution,
            ctx.weights.len()
        );

        let mut chunks = if config.parallel {
            generate_parallel(&ctx, &coords)?
        } else {
            coords
                .iter()
                .map(|&coord| generate_chunk(&ctx, coord))
                .collect::<Result<Vec<_>, _>>()?
        };
        let stitched = stitch_chunks(&mut chunks)?;
        log::debug!("Stitched {stitched} border vertex pairs");

        let biomes: Vec<Biome> = config.biomes.iter().cloned().collect();
        let mut scatter = Scatter::new(feature_seed, config.reference_resolution);
        let placements: Vec<FeaturePlacement> = chunks
            .iter()
            .flat_map(|chunk| scatter.scatter_chunk(chunk, &biomes, &ctx))
            .collect();

        let stats = GenerationStats {
            world_seed,
            feature_seed,
            chunks: chunks.len(),
            vertices: chunks.iter().map(|c| c.mesh.vertex_count()).sum(),
            triangles: chunks.iter().map(|c| c.mesh.triangle_count()).sum(),
            placements: placements.len(),
            elapsed: started.elapsed(),
        };
        log::info!(
            "Generated {} chunks: {} vertices, {} triangles, {} placements in {:.2?}",
            stats.chunks,
            stats.vertices,
            stats.triangles,
            stats.placements,
            stats.elapsed
        );

        self.chunks = chunks;
        self.placements = placements;
        self.biomes = biomes;
        self.chunk_size = config.chunk_size;
        self.stats = stats;
        Ok(&self.stats)
    }

    /// Chunks sorted by coordinate.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks
            .binary_search_by_key(&coord, |c| c.coord)
            .ok()
            .map(|index| &self.chunks[index])
    }

    pub fn placements(&self) -> &[FeaturePlacement] {
        &self.placements
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Biomes referenced by the current chunks, in biome-index order.
    pub fn biomes(&self) -> &[Biome] {
        &self.biomes
    }

    /// Biome under a world position: the dominant biome of the nearest vertex of the
    /// chunk containing it. `None` outside the generated grid.
    pub fn sample_player_biome(&self, position: Vec3) -> Option<&Biome> {
        if self.chunks.is_empty() {
            return None;
        }
        let coord = ChunkCoord::containing(position.x, position.z, self.chunk_size);
        let Some(chunk) = self.chunk(coord) else {
            log::debug!("Position {position} is outside the generated chunks");
            return None;
        };
        let vertex = chunk.nearest_vertex(position.x, position.z);
        self.biomes.get(chunk.dominant_biome(vertex))
    }

    /// Drop all generated data.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Builds chunks on a scoped worker pool and returns them sorted by coordinate.
fn generate_parallel(ctx: &ChunkContext, coords: &[ChunkCoord]) -> Result<Vec<Chunk>, TerrainError> {
    let workers = num_cpus::get().clamp(1, coords.len().max(1));
    let (task_tx, task_rx) = crossbeam_channel::unbounded::<ChunkCoord>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded();

    for &coord in coords {
        // The receiver is alive until the end of this function.
        let _ = task_tx.send(coord);
    }
    drop(task_tx);

    log::debug!("Generating {} chunks on {workers} workers", coords.len());
    std::thread::scope(|scope| {
        for n in 0..workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("chunk-worker-{n}"))
                .spawn_scoped(scope, move || {
                    for coord in task_rx.iter() {
                        if result_tx.send(generate_chunk(ctx, coord)).is_err() {
                            break;
                        }
                    }
                });
            if let Err(e) = spawned {
                log::warn!("Failed to spawn chunk-worker-{n}: {e}");
            }
        }
    });
    // Leftovers when no worker could be spawned.
    for coord in task_rx.try_iter() {
        let _ = result_tx.send(generate_chunk(ctx, coord));
    }
    drop(result_tx);

    let mut chunks = result_rx.iter().collect::<Result<Vec<_>, _>>()?;
    chunks.sort_by_key(|c| c.coord);
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> TerrainConfig {
        TerrainConfig {
            chunk_size: 20.0,
            chunk_resolution: 12,
            ..TerrainConfig::sample_world()
        }
    }

    #[test]
    fn test_sample_world_is_valid() {
        assert!(TerrainConfig::sample_world().validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let empty = TerrainConfig::default();
        assert_eq!(empty.validate(), Err(TerrainError::NoBiomes));

        let mut cfg = small_world();
        cfg.chunk_size = 0.0;
        assert_eq!(cfg.validate(), Err(TerrainError::InvalidChunkSize(0.0)));

        let mut cfg = small_world();
        cfg.chunk_resolution = 1;
        assert_eq!(cfg.validate(), Err(TerrainError::InvalidResolution(1)));

        let mut cfg = small_world();
        cfg.biomes_per_chunk = 0;
        assert_eq!(cfg.validate(), Err(TerrainError::NoBiomesPerChunk));

        let mut cfg = small_world();
        let first = cfg.biomes.iter().next().unwrap().id();
        cfg.biomes.get_mut(first).unwrap().frequency_weight = -1.0;
        assert!(matches!(cfg.validate(), Err(TerrainError::InvalidWeight { .. })));

        let mut cfg = small_world();
        for id in cfg.biomes.iter().map(Biome::id).collect::<Vec<_>>() {
            cfg.biomes.get_mut(id).unwrap().frequency_weight = 0.0;
        }
        assert_eq!(cfg.validate(), Err(TerrainError::AllWeightsZero));
    }

    #[test]
    fn test_missing_and_cyclic_heightmaps_rejected() {
        let mut cfg = small_world();
        let first = cfg.biomes.iter().next().unwrap().id();
        cfg.biomes.get_mut(first).unwrap().set_heightmap(None);
        assert!(matches!(cfg.validate(), Err(TerrainError::MissingHeightmap { .. })));

        let mut cfg = small_world();
        let looped = cfg.heightmaps.add("loop", Heightmap::multi([]));
        if let Some(Heightmap::Multi(m)) = cfg.heightmaps.get_mut(looped) {
            m.children.push(looped);
        }
        cfg.biomes.get_mut(first).unwrap().set_heightmap(Some(looped));
        assert!(matches!(cfg.validate(), Err(TerrainError::Heightmap { .. })));

        let mut cfg = small_world();
        cfg.biomes.get_mut(first).unwrap().set_heightmap(Some(HeightmapId(999)));
        assert!(matches!(cfg.validate(), Err(TerrainError::Heightmap { .. })));
    }

    #[test]
    fn test_generate_populates_grid() {
        let mut terrain = Terrain::new();
        let stats = terrain.generate(&small_world()).unwrap().clone();
        assert_eq!(stats.chunks, 9);
        assert_eq!(stats.vertices, 9 * 144);
        assert_eq!(stats.triangles, 9 * 11 * 11 * 2);
        assert_eq!(stats.placements, terrain.placements().len());
        assert_eq!(terrain.chunks().len(), 9);
        assert!(terrain.chunk(ChunkCoord::new(-1, 1)).is_some());
        assert!(terrain.chunk(ChunkCoord::new(2, 0)).is_none());
    }

    #[test]
    fn test_grid_radius() {
        let mut cfg = small_world();
        cfg.grid_radius = 0;
        let mut terrain = Terrain::new();
        assert_eq!(terrain.generate(&cfg).unwrap().chunks, 1);
        cfg.grid_radius = 2;
        assert_eq!(terrain.generate(&cfg).unwrap().chunks, 25);
    }

    #[test]
    fn test_failed_run_keeps_previous_state() {
        let mut terrain = Terrain::new();
        terrain.generate(&small_world()).unwrap();
        let before = terrain.chunks().to_vec();
        let placements = terrain.placements().to_vec();

        let mut broken = small_world();
        broken.chunk_resolution = 0;
        assert!(terrain.generate(&broken).is_err());
        assert_eq!(terrain.chunks(), before.as_slice());
        assert_eq!(terrain.placements(), placements.as_slice());
    }

    #[test]
    fn test_player_biome_lookup() {
        let mut terrain = Terrain::new();
        assert!(terrain.sample_player_biome(Vec3::ZERO).is_none());
        terrain.generate(&small_world()).unwrap();

        let chunk = terrain.chunk(ChunkCoord::new(1, 0)).unwrap();
        let vertex = chunk.mesh.vertex_index(3, 7);
        let position = chunk.world_position(vertex);
        let expected = &terrain.biomes()[chunk.dominant_biome(vertex)];
        assert_eq!(terrain.sample_player_biome(position).map(Biome::id), Some(expected.id()));

        assert!(terrain.sample_player_biome(Vec3::new(1000.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential = Terrain::new();
        sequential.generate(&small_world()).unwrap();
        let mut cfg = small_world();
        cfg.parallel = true;
        let mut parallel = Terrain::new();
        parallel.generate(&cfg).unwrap();
        assert_eq!(sequential.chunks(), parallel.chunks());
        assert_eq!(sequential.placements(), parallel.placements());
    }

    #[test]
    fn test_clear() {
        let mut terrain = Terrain::new();
        terrain.generate(&small_world()).unwrap();
        terrain.clear();
        assert!(terrain.chunks().is_empty());
        assert!(terrain.placements().is_empty());
    }
}
