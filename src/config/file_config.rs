//! TOML file configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML configuration. Every field is optional; present values
/// override CLI arguments during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub image: Option<ImageFileConfig>,
    pub placard: Option<PlacardFileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageFileConfig {
    /// Base seconds of the linear retry backoff on rate limiting.
    pub retry_base_secs: Option<u64>,
    pub retry_max_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacardFileConfig {
    pub retry_base_secs: Option<u64>,
    pub retry_max_attempts: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }
}
