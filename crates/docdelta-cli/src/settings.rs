//! Configuration file
//!
//! One TOML file holds both the comparison and the extraction options:
//!
//! ```toml
//! [compare]
//! mode = "content_based"
//! similarity_threshold = 0.6
//!
//! [extract]
//! max_file_size_mb = 20
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use docdelta_core::{CompareOptions, ConfigError};
use docdelta_ooxml::ExtractOptions;
use serde::{Deserialize, Serialize};

/// File names probed in the working directory when no `--config` is given
pub const CONFIG_CANDIDATES: [&str; 2] = ["docdelta.toml", ".docdelta.toml"];

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Comparison options
    pub compare: CompareOptions,
    /// Extraction options
    pub extract: ExtractOptions,
}

impl Settings {
    /// Parse and validate settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        settings.compare.validate()?;
        Ok(settings)
    }
}

/// Load settings from an explicit path, a file in the working directory, or defaults
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Settings::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => {
            for candidate in CONFIG_CANDIDATES {
                let path = Path::new(candidate);
                if path.exists() {
                    let content = fs::read_to_string(path)
                        .with_context(|| format!("Failed to read config: {}", candidate))?;
                    return Settings::from_toml_str(&content)
                        .with_context(|| format!("Failed to parse config: {}", candidate));
                }
            }
            Ok(Settings::default())
        }
    }
}
