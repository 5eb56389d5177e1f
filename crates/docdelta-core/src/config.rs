//! Comparison options
//!
//! Options are passed explicitly into every comparison; nothing here is
//! process-wide.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How blocks are paired between the two documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Order-aware alignment with move detection
    #[default]
    Positional,
    /// Pair purely by content similarity, ignoring position
    ContentBased,
}

impl CompareMode {
    pub fn name(self) -> &'static str {
        match self {
            CompareMode::Positional => "positional",
            CompareMode::ContentBased => "content_based",
        }
    }
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positional" | "position" => Ok(CompareMode::Positional),
            "content" | "content_based" | "content-based" => Ok(CompareMode::ContentBased),
            other => Err(format!(
                "unknown mode '{}', expected 'positional' or 'content'",
                other
            )),
        }
    }
}

/// Tunable comparison policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    pub mode: CompareMode,
    /// A candidate pair must score strictly above this to match
    pub similarity_threshold: f64,
    /// Weight of text similarity in paragraph scores
    pub text_weight: f64,
    /// Weight of formatting similarity in paragraph scores
    pub style_weight: f64,
    /// Weight of row/column count agreement in table scores
    pub table_shape_weight: f64,
    pub ignore_case: bool,
    /// Treat runs of whitespace as a single space
    pub normalize_whitespace: bool,
    /// Pair leftover images between the same anchors as replacements
    pub pair_replaced_images: bool,
    /// Differences listed in a description before it is abbreviated
    pub max_differences_display: usize,
    /// Characters of a quoted value kept in descriptions
    pub max_value_length: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            mode: CompareMode::Positional,
            similarity_threshold: 0.5,
            text_weight: 0.9,
            style_weight: 0.1,
            table_shape_weight: 0.2,
            ignore_case: false,
            normalize_whitespace: true,
            pair_replaced_images: true,
            max_differences_display: 5,
            max_value_length: 50,
        }
    }
}

impl CompareOptions {
    /// Default options with the given mode
    pub fn with_mode(mode: CompareMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Parse and validate options from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(toml_str)?;
        options.validate()?;
        Ok(options)
    }

    /// Check thresholds and weights
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold(self.similarity_threshold));
        }

        let weights = [
            ("text_weight", self.text_weight),
            ("style_weight", self.style_weight),
            ("table_shape_weight", self.table_shape_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        if self.table_shape_weight > 1.0 {
            return Err(ConfigError::InvalidWeight {
                name: "table_shape_weight",
                value: self.table_shape_weight,
            });
        }
        if self.text_weight + self.style_weight == 0.0 {
            return Err(ConfigError::ZeroWeights);
        }
        Ok(())
    }
}
