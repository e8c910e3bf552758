//! CLI command implementations.

pub mod init_config;
pub mod params;
pub mod render;

use anyhow::Context;
use std::path::Path;
use tapsynth_config::EngineConfig;

/// Load and validate `path`, or fall back to the default configuration.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_validated(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}
