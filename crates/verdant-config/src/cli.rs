//! Command-line argument parsing for Verdant.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Verdant command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "verdant", about = "Biome-blended chunked terrain generator")]
pub struct CliArgs {
    /// World seed string (terrain shape and biome layout).
    #[arg(long)]
    pub seed: Option<String>,

    /// Feature seed string (scatter layout).
    #[arg(long)]
    pub feature_seed: Option<String>,

    /// Chunk edge length in world units.
    #[arg(long)]
    pub chunk_size: Option<f32>,

    /// Vertices per chunk edge.
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Voronoi seeds per biome-map cell.
    #[arg(long)]
    pub biomes_per_chunk: Option<usize>,

    /// Chunks generated on each side of the origin chunk.
    #[arg(long)]
    pub grid_radius: Option<u32>,

    /// Generate chunks on a worker pool.
    #[arg(long)]
    pub parallel: Option<bool>,

    /// Output directory for OBJ files and placements.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let terrain = &mut self.terrain;
        if let Some(ref seed) = args.seed {
            terrain.world_seed = seed.clone();
        }
        if let Some(ref seed) = args.feature_seed {
            terrain.feature_seed = seed.clone();
        }
        if let Some(size) = args.chunk_size {
            terrain.chunk_size = size;
        }
        if let Some(res) = args.resolution {
            terrain.chunk_resolution = res;
        }
        if let Some(n) = args.biomes_per_chunk {
            terrain.biomes_per_chunk = n;
        }
        if let Some(radius) = args.grid_radius {
            terrain.grid_radius = radius;
        }
        if let Some(parallel) = args.parallel {
            terrain.parallel = parallel;
        }
        if let Some(ref dir) = args.output {
            self.export.output_dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
