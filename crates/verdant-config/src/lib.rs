//! Configuration for Verdant terrain runs.
//!
//! Settings persist to disk as a RON file, can be overridden from the command line,
//! and stay forward/backward compatible because every section falls back to its
//! defaults when a field is missing.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE_NAME, Config, DebugConfig, ExportConfig, ImageBinding};
pub use error::ConfigError;
