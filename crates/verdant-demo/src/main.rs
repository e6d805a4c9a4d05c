//! Demo binary that generates a Verdant terrain and writes it to disk.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p verdant-demo` to generate the sample world.
//! Run with `cargo run -p verdant-demo -- --seed mesa --grid-radius 2` to change it.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Parser;
use glam::Vec3;
use serde::Serialize;
use tracing::{error, info, warn};
use verdant_config::{CliArgs, Config};
use verdant_mesh::{export_obj, index_bytes, interleave, vertex_bytes};
use verdant_terrain::{FeaturePlacement, GenerationStats, HeightImage, Terrain};

/// Contents of `placements.json`.
#[derive(Serialize)]
struct PlacementDump<'a> {
    stats: &'a GenerationStats,
    placements: &'a [FeaturePlacement],
}

/// Decodes every configured image and attaches it to its heightmap.
///
/// A failed image is logged and skipped; lookups into that heightmap then fail and
/// contribute zero height.
fn load_images(config: &mut Config) -> usize {
    let mut attached = 0;
    for (id, path) in config.image_paths() {
        let image = match image::open(&path) {
            Ok(image) => image.to_luma32f(),
            Err(e) => {
                warn!("Failed to load heightmap image {}: {e}", path.display());
                continue;
            }
        };
        let (width, height) = image.dimensions();
        let result = HeightImage::from_gray(width, height, image.into_raw())
            .and_then(|pixels| config.terrain.heightmaps.attach_image(id, pixels));
        match result {
            Ok(()) => {
                info!("Attached {}x{} image {} to heightmap {id}", width, height, path.display());
                attached += 1;
            }
            Err(e) => warn!("Heightmap {id}: {e}"),
        }
    }
    attached
}

/// Writes one OBJ per chunk and returns the number of files written.
fn write_chunks(terrain: &Terrain, output_dir: &Path) -> Result<usize, Box<dyn Error>> {
    let mut written = 0;
    let mut upload_bytes = 0;
    for chunk in terrain.chunks() {
        let path = output_dir.join(format!("chunk_{}_{}.obj", chunk.coord.x, chunk.coord.z));
        export_obj(&chunk.mesh, &path)?;
        let vertices = interleave(&chunk.mesh);
        upload_bytes += vertex_bytes(&vertices).len() + index_bytes(&chunk.mesh).len();
        written += 1;
    }
    info!("Wrote {written} OBJ files ({upload_bytes} bytes of vertex and index data)");
    Ok(written)
}

fn write_placements(terrain: &Terrain, path: &Path) -> Result<(), Box<dyn Error>> {
    let dump = PlacementDump {
        stats: terrain.stats(),
        placements: terrain.placements(),
    };
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &dump)?;
    info!("Wrote {} placements to {}", dump.placements.len(), path.display());
    Ok(())
}

fn resolve_config_dir(args: &CliArgs) -> PathBuf {
    args.config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from(".verdant"))
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let config_dir = resolve_config_dir(&args);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config.log_dir(&config_dir);
    verdant_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        error!("Configuration rejected: {e}");
        return Err(e.into());
    }

    let images = load_images(&mut config);
    if images > 0 {
        info!("{images} heightmap images attached");
    }

    let mut terrain = Terrain::new();
    if let Err(e) = terrain.generate(&config.terrain) {
        error!("Terrain generation failed: {e}");
        return Err(e.into());
    }

    let output_dir = &config.export.output_dir;
    std::fs::create_dir_all(output_dir)?;
    if config.export.write_obj {
        write_chunks(&terrain, output_dir)?;
    }
    if config.export.write_placements {
        write_placements(&terrain, &output_dir.join("placements.json"))?;
    }

    match terrain.sample_player_biome(Vec3::ZERO) {
        Some(biome) => info!("Biome at the origin: {}", biome.name),
        None => warn!("No biome found at the origin"),
    }

    info!("Output written to {}", output_dir.display());
    Ok(())
}
