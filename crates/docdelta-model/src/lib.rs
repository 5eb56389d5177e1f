//! # docdelta-model
//!
//! Comparable document model and change set schema.
//!
//! A [`DocumentModel`] is built once per document snapshot (see
//! `docdelta-ooxml`) and is immutable afterwards. Comparing two models
//! (see `docdelta-core`) yields a [`ChangeSet`].
//!
//! ## Example
//!
//! ```
//! use docdelta_model::{BlockKind, DocumentModel, Paragraph};
//!
//! let doc = DocumentModel::from_kinds(vec![
//!     BlockKind::Paragraph(Paragraph::plain("Introduction").with_heading_level(1)),
//!     BlockKind::Paragraph(Paragraph::plain("Body text")),
//! ]);
//! assert_eq!(doc.section_path(1), "Introduction");
//! ```

pub mod change;
pub mod document;
pub mod fingerprint;
pub mod statistics;

pub use change::{
    CellChange, Change, ChangeDetail, ChangeKind, ChangeSet, EditCategory, ImageDelta,
    MoveDetail, RowChange, Side, SpanTag, StyleAttribute, StyleChange, TextSpan,
};
pub use document::{
    Alignment, Block, BlockKind, BlockVariant, Cell, DocumentModel, Image, Paragraph, Row, Run,
    Table,
};
pub use fingerprint::{content_hash, Fingerprint, FingerprintBuilder, DIGEST_PREFIX};
pub use statistics::{ChangeStatistics, KindCounts};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
