//! Deterministic per-vertex feature scatter.
//!
//! Every vertex of a chunk gets one uniform draw per feature of its dominant biome,
//! tried from the rarest feature to the most common. The first feature whose draw
//! wins claims the vertex. The RNG stream is keyed only by the feature seed and the
//! chunk coordinates, so results do not depend on generation order.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use hashbrown::HashSet;
use rand::Rng;
use serde::Serialize;

use crate::biome::{Biome, BiomeId, Feature, FeatureId, PrefabHandle};
use crate::chunk::{Chunk, ChunkContext, ChunkCoord};
use crate::seed::{chunk_rng, det_exp};

/// Resolution at which feature frequencies produce their nominal density.
pub const DEFAULT_REFERENCE_RESOLUTION: f32 = 100.0;

/// A "spawn this prefab here" event for the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeaturePlacement {
    pub prefab: PrefabHandle,
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
    pub biome: BiomeId,
    pub feature: FeatureId,
    pub chunk: ChunkCoord,
}

/// Per-run scatter settings and state.
#[derive(Debug)]
pub struct Scatter {
    feature_seed: i32,
    reference_resolution: f32,
    warned: HashSet<(BiomeId, FeatureId)>,
}

impl Scatter {
    pub fn new(feature_seed: i32, reference_resolution: f32) -> Self {
        Self {
            feature_seed,
            reference_resolution,
            warned: HashSet::new(),
        }
    }

    /// Scatter features over one chunk.
    ///
    /// `biomes` must be in biome-index order, matching the indices stored in the
    /// chunk's vertices. `ctx` supplies the heightmaps used to align features to the
    /// surface.
    pub fn scatter_chunk(
        &mut self,
        chunk: &Chunk,
        biomes: &[Biome],
        ctx: &ChunkContext,
    ) -> Vec<FeaturePlacement> {
        let mesh = &chunk.mesh;
        let correction = density_correction(self.reference_resolution, mesh.resolution());
        let sorted: Vec<Vec<&Feature>> = biomes.iter().map(Biome::sorted_features).collect();
        let mut rng = chunk_rng(self.feature_seed, chunk.coord.x, chunk.coord.z);
        let mut placements = Vec::new();

        for vertex in 0..mesh.vertex_count() {
            let biome_index = mesh.biome_index(vertex);
            let Some(features) = sorted.get(biome_index) else {
                continue;
            };
            for feature in features {
                let draw: f32 = rng.random();
                if draw >= spawn_probability(feature.frequency(), correction) {
                    continue;
                }
                let biome = biomes[biome_index].id();
                match &feature.prefab {
                    Some(prefab) => {
                        let rotation = if feature.set_normal {
                            let normal = surface_normal(chunk, ctx, vertex, biome_index);
                            Quat::from_rotation_arc(Vec3::Y, normal)
                        } else {
                            Quat::from_rotation_y(rng.random::<f32>() * TAU)
                        };
                        placements.push(FeaturePlacement {
                            prefab: prefab.clone(),
                            position: chunk.world_position(vertex),
                            scale: feature.scale(),
                            rotation,
                            biome,
                            feature: feature.id(),
                            chunk: chunk.coord,
                        });
                    }
                    None => {
                        if self.warned.insert((biome, feature.id())) {
                            log::warn!(
                                "Feature '{}' of biome {biome} has no prefab; skipping its placements",
                                feature.name
                            );
                        }
                    }
                }
                break;
            }
        }

        log::debug!("Chunk {}: {} features placed", chunk.coord, placements.len());
        placements
    }
}

/// Normal of the dominant biome's heightmap under `vertex`, or the mesh normal when
/// that heightmap cannot be evaluated.
fn surface_normal(chunk: &Chunk, ctx: &ChunkContext, vertex: usize, biome_index: usize) -> Vec3 {
    let mesh_normal = Vec3::from(chunk.mesh.normals[vertex]);
    let Some(&id) = ctx.heightmaps.get(biome_index) else {
        return mesh_normal;
    };
    let position = chunk.world_position(vertex);
    match ctx.library.normal(id, position.x, position.z) {
        Ok(normal) if normal.is_finite() => normal,
        _ => mesh_normal,
    }
}

/// `(reference_resolution / resolution)^2`: keeps placements per area constant when
/// the mesh gets denser.
pub fn density_correction(reference_resolution: f32, resolution: usize) -> f32 {
    let ratio = reference_resolution / resolution as f32;
    ratio * ratio
}

/// Chance that a feature of `frequency` claims a vertex.
///
/// A logistic curve centred on frequency 66.7 and capped at `0.1 * correction`.
/// Frequency zero never spawns.
pub fn spawn_probability(frequency: u32, correction: f32) -> f32 {
    if frequency == 0 {
        return 0.0;
    }
    let x = (frequency as f32 * 0.75 - 50.0) / 5.0;
    correction * 0.1 / (1.0 + det_exp(-x))
}
