//! # docdelta-ooxml
//!
//! DOCX (Office Open XML) extraction for docdelta.
//!
//! This crate provides functionality to:
//! - Read and validate DOCX/DOCM containers
//! - Resolve style inheritance into effective run formatting
//! - Detect headings in documents with custom templates
//! - Build a [`docdelta_model::DocumentModel`] of paragraphs, tables and images
//!
//! ## Example
//!
//! ```no_run
//! use docdelta_ooxml::{ExtractOptions, Extractor};
//!
//! let extractor = Extractor::new(ExtractOptions::default());
//! let model = extractor.extract_file("report.docx")?;
//!
//! for block in &model.blocks {
//!     println!("{} {}", block.index, block.variant());
//! }
//! # Ok::<(), docdelta_ooxml::ExtractionError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod extract;
pub mod heading;
pub mod image;
pub mod properties;
pub mod relationships;
pub mod styles;
pub mod test_utils;

pub use archive::OoxmlArchive;
pub use document::{RawBlock, RawDocument, RawDrawing, RawParagraph, RawRun, RawTable};
pub use error::{ExtractionError, Result};
pub use extract::{extract_file, ExtractOptions, Extractor};
pub use heading::detect_heading_level;
pub use properties::{ParagraphProperties, RunProperties};
pub use relationships::Relationships;
pub use styles::{resolve_effective_style, ResolvedStyle, Style, StyleSheet, StyleType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
