//! Error types for docdelta-core

use docdelta_model::Side;
use thiserror::Error;

/// A contract violation between the extractor and the comparator
///
/// Never expected for models built by `docdelta-ooxml`; comparison stops
/// instead of producing a partial change set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalConsistencyError {
    /// A block's stored index differs from its position
    #[error("{side} block at position {position} carries index {index}")]
    IndexMismatch {
        side: Side,
        position: usize,
        index: usize,
    },

    /// A block or row has an empty fingerprint
    #[error("{side} block {index} has no fingerprint")]
    MissingFingerprint { side: Side, index: usize },

    /// A block is covered by zero or several changes
    #[error("{side} block {index} appears in {count} changes instead of one")]
    IncompleteMatching {
        side: Side,
        index: usize,
        count: usize,
    },
}

/// Invalid comparison options
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Threshold outside `[0, 1]`
    #[error("similarity threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    /// Negative or non-finite weight
    #[error("{name} must be a finite, non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    /// Text and style weights are both zero
    #[error("text_weight and style_weight cannot both be zero")]
    ZeroWeights,

    /// Malformed TOML
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
