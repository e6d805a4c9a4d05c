//! Configuration error types.

use std::path::PathBuf;

use verdant_terrain::{HeightmapId, TerrainError};

/// Errors that can occur when loading, saving, or checking configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid RON for [`crate::Config`].
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The world definition would be rejected by the generator.
    #[error("invalid terrain: {0}")]
    InvalidTerrain(#[from] TerrainError),

    /// An image binding names a heightmap that is missing or not an image heightmap.
    #[error("image {path} is bound to heightmap {heightmap}, which is not an image heightmap")]
    UnboundImage { heightmap: HeightmapId, path: PathBuf },
}
