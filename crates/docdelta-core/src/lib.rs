//! docdelta-core - Structural diff for document models
//!
//! Aligns the blocks of two [`DocumentModel`](docdelta_model::DocumentModel)
//! snapshots, classifies every block as inserted, deleted, modified, moved
//! or unchanged, and describes each difference.
//!
//! # Example
//!
//! ```
//! use docdelta_core::{compare, CompareMode};
//! use docdelta_model::{BlockKind, ChangeKind, DocumentModel, Paragraph};
//!
//! let before = DocumentModel::from_kinds(vec![
//!     BlockKind::Paragraph(Paragraph::plain("The server costs 1000 dollars")),
//! ]);
//! let after = DocumentModel::from_kinds(vec![
//!     BlockKind::Paragraph(Paragraph::plain("The server costs 1500 dollars")),
//! ]);
//!
//! let changes = compare(&before, &after, CompareMode::Positional).unwrap();
//! assert_eq!(changes.changes()[0].kind, ChangeKind::Modified);
//! assert_eq!(changes.changes()[0].description, "'1000' changed to '1500'");
//! ```

pub mod classifier;
pub mod comparator;
pub mod config;
pub mod describe;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod similarity;
pub mod textdiff;

// Re-export main types and functions
pub use classifier::{edit_category, Classifier};
pub use comparator::{compare, compare_many, Comparator};
pub use config::{CompareMode, CompareOptions};
pub use describe::Describer;
pub use error::{ConfigError, InternalConsistencyError};
pub use matcher::{align, Matching, Pair, Step};
pub use similarity::{Comparable, Scorer, TextProfile};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
