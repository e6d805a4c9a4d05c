//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use verdant_terrain::{Heightmap, HeightmapId, TerrainConfig};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World definition: seeds, grid, biomes and heightmaps.
    pub terrain: TerrainConfig,
    /// What the demo writes after a run.
    pub export: ExportConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Image files for image heightmaps, overriding any path stored on the heightmap.
    pub images: Vec<ImageBinding>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving OBJ files and the placement dump.
    pub output_dir: PathBuf,
    /// Write one `chunk_<x>_<z>.obj` per chunk.
    pub write_obj: bool,
    /// Write `placements.json`.
    pub write_placements: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "verdant_terrain=trace").
    pub log_level: String,
    /// Directory for the JSON log file. Relative to the config directory when unset.
    pub log_dir: Option<PathBuf>,
}

/// Binds an image heightmap to a file on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageBinding {
    pub heightmap: HeightmapId,
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::sample_world(),
            export: ExportConfig::default(),
            debug: DebugConfig::default(),
            images: Vec::new(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("verdant-output"),
            write_obj: true,
            write_placements: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Platform config directory for Verdant, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("verdant"))
    }

    /// Every image heightmap paired with the file to load for it.
    ///
    /// Paths stored on the heightmaps come first; an [`ImageBinding`] for the same id
    /// replaces them. Bindings for ids that are not image heightmaps are kept so the
    /// attach step can report them.
    pub fn image_paths(&self) -> Vec<(HeightmapId, PathBuf)> {
        let mut paths: Vec<(HeightmapId, PathBuf)> = self
            .terrain
            .heightmaps
            .image_sources()
            .map(|(id, path)| (id, path.to_path_buf()))
            .collect();
        for binding in &self.images {
            match paths.iter_mut().find(|(id, _)| *id == binding.heightmap) {
                Some(entry) => entry.1 = binding.path.clone(),
                None => paths.push((binding.heightmap, binding.path.clone())),
            }
        }
        paths
    }

    /// Check the world definition and every image binding.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        for binding in &self.images {
            let is_image = self
                .terrain
                .heightmaps
                .iter()
                .any(|e| e.id == binding.heightmap && matches!(e.heightmap, Heightmap::Image(_)));
            if !is_image {
                return Err(ConfigError::UnboundImage {
                    heightmap: binding.heightmap,
                    path: binding.path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Log directory: the configured one, or `logs/` under `config_dir`.
    pub fn log_dir(&self, config_dir: &Path) -> PathBuf {
        self.debug
            .log_dir
            .clone()
            .unwrap_or_else(|| config_dir.join("logs"))
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(6)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_terrain::ImageHeightmap;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(6))
                .unwrap();
        assert!(ron_str.contains("world_seed: \"verdant\""));
        assert!(ron_str.contains("write_obj: true"));
        assert!(ron_str.contains("Grassland"));
    }

    #[test]
    fn test_default_world_is_valid() {
        let config = Config::default();
        assert_eq!(config.terrain.biomes.len(), 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_terrain() {
        let mut config = Config::default();
        config.terrain.chunk_resolution = 1;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTerrain(_))));
    }

    #[test]
    fn test_validate_rejects_binding_to_non_image() {
        let mut config = Config::default();
        let hills = config.terrain.heightmaps.iter().next().unwrap().id;
        config.images.push(ImageBinding {
            heightmap: hills,
            path: PathBuf::from("hills.png"),
        });
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnboundImage { heightmap, .. } if heightmap == hills));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(debug: (log_level: \"debug\"))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.export, ExportConfig::default());
        assert_eq!(config.debug.log_level, "debug");
        assert_eq!(config.debug.log_dir, None);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.terrain.world_seed = "archipelago".to_string();
        config.terrain.grid_radius = 2;
        config.export.write_obj = false;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.terrain.chunk_resolution = 64;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.terrain.chunk_resolution), Some(64));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_image_bindings_override_stored_paths() {
        let mut config = Config::default();
        let stored = config.terrain.heightmaps.add(
            "cliffs",
            Heightmap::Image(ImageHeightmap {
                source: Some(PathBuf::from("cliffs.png")),
                ..Default::default()
            }),
        );
        let bound = config
            .terrain
            .heightmaps
            .add("mesa", Heightmap::Image(ImageHeightmap::default()));
        config.images.push(ImageBinding {
            heightmap: bound,
            path: PathBuf::from("mesa.png"),
        });
        config.images.push(ImageBinding {
            heightmap: stored,
            path: PathBuf::from("cliffs_hd.png"),
        });

        let paths = config.image_paths();
        assert_eq!(
            paths,
            vec![
                (stored, PathBuf::from("cliffs_hd.png")),
                (bound, PathBuf::from("mesa.png")),
            ]
        );
    }

    #[test]
    fn test_log_dir_falls_back_to_config_dir() {
        let mut config = Config::default();
        assert_eq!(config.log_dir(Path::new("/cfg")), PathBuf::from("/cfg/logs"));
        config.debug.log_dir = Some(PathBuf::from("/var/log/verdant"));
        assert_eq!(config.log_dir(Path::new("/cfg")), PathBuf::from("/var/log/verdant"));
    }
}
