//! # Waystation Configuration
//!
//! Service configuration with support for:
//! - Multiple formats (YAML, TOML, JSON)
//! - Environment variable expansion
//! - Validation
//! - Default values

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod loader;
pub mod types;
pub mod validator;

pub use loader::{load_config, load_from_file, load_from_str};
pub use types::{Config, DatabaseConfig, LogFormat, LoggingConfig, StatsConfig};
pub use validator::validate_config;

use std::path::Path;
use waystation_core::{Error, Result};

/// Load and validate `waystation.{yaml,yml,toml,json}`
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    load_config(path)
}

/// Parse configuration text without validating it
pub fn load_str(content: &str, format: ConfigFormat) -> Result<Config> {
    load_from_str(content, format)
}

/// Supported file formats, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Format for `path`; extension matching ignores case
    pub fn from_path(path: &Path) -> Result<Self> {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return Err(Error::Config(format!(
                "Config file '{}' has no extension",
                path.display()
            )));
        };

        match extension.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!("Unsupported config format: {other}"))),
        }
    }
}
