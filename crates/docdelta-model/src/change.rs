//! ChangeSet schema
//!
//! The ordered, total classification of differences between two
//! [`DocumentModel`](crate::DocumentModel)s. Exporters depend on this schema.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::BlockVariant;
use crate::statistics::ChangeStatistics;

/// Which of the two compared documents an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Before => f.write_str("before"),
            Side::After => f.write_str("after"),
        }
    }
}

/// Classification of a single change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Inserted,
    Deleted,
    Modified,
    Moved,
    Unchanged,
}

impl ChangeKind {
    /// Lowercase name used in reports
    pub fn name(self) -> &'static str {
        match self {
            ChangeKind::Inserted => "inserted",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
            ChangeKind::Moved => "moved",
            ChangeKind::Unchanged => "unchanged",
        }
    }

    /// Whether this kind represents an actual difference
    pub fn is_visible(self) -> bool {
        self != ChangeKind::Unchanged
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of changes covering every block of both documents
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// All changes, including `Unchanged` entries
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Iterate over all changes
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Number of entries, including `Unchanged`
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if there are no entries at all
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes with `Unchanged` entries elided
    pub fn visible(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| c.kind.is_visible())
    }

    /// Check if any entry is a real difference
    pub fn has_differences(&self) -> bool {
        self.visible().next().is_some()
    }

    /// Counts and percentages per change kind and variant
    pub fn statistics(&self) -> ChangeStatistics {
        ChangeStatistics::from_changes(&self.changes)
    }
}

impl From<Vec<Change>> for ChangeSet {
    fn from(changes: Vec<Change>) -> Self {
        Self { changes }
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// One entry of a [`ChangeSet`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    /// Variant of the block(s) involved
    pub variant: BlockVariant,
    /// Index into the before document, absent for insertions
    pub before: Option<usize>,
    /// Index into the after document, absent for deletions
    pub after: Option<usize>,
    /// Match score for paired blocks
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub similarity: Option<f64>,
    /// Kind-specific payload
    #[serde(default)]
    pub detail: ChangeDetail,
    /// Human-readable summary, empty for `Unchanged`
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

impl Change {
    /// A block present only in the after document
    pub fn inserted(variant: BlockVariant, after: usize) -> Self {
        Self::bare(ChangeKind::Inserted, variant, None, Some(after))
    }

    /// A block present only in the before document
    pub fn deleted(variant: BlockVariant, before: usize) -> Self {
        Self::bare(ChangeKind::Deleted, variant, Some(before), None)
    }

    /// A matched pair with the given classification
    pub fn matched(kind: ChangeKind, variant: BlockVariant, before: usize, after: usize) -> Self {
        Self::bare(kind, variant, Some(before), Some(after))
    }

    fn bare(
        kind: ChangeKind,
        variant: BlockVariant,
        before: Option<usize>,
        after: Option<usize>,
    ) -> Self {
        Self {
            kind,
            variant,
            before,
            after,
            similarity: None,
            detail: ChangeDetail::default(),
            description: String::new(),
        }
    }

    /// Set the similarity score
    pub fn with_similarity(mut self, similarity: f64) -> Self {
        self.similarity = Some(similarity);
        self
    }

    /// Set the detail payload
    pub fn with_detail(mut self, detail: ChangeDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Index on the given side
    pub fn index(&self, side: Side) -> Option<usize> {
        match side {
            Side::Before => self.before,
            Side::After => self.after,
        }
    }
}

/// Kind-specific payload of a [`Change`]
///
/// Fields that do not apply to a change are left empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeDetail {
    /// Source and destination positions of a moved block
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub moved: Option<MoveDetail>,
    /// Token-level text diff, empty when the text is unchanged
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub text: Vec<TextSpan>,
    /// Attribute-level style differences
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub style: Vec<StyleChange>,
    /// Coarse category of a paragraph edit
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<EditCategory>,
    /// Old and new image properties
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<ImageDelta>,
    /// Row-level changes of a table, in after-table order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub rows: Vec<RowChange>,
}

impl ChangeDetail {
    /// Check if the payload carries no content differences
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.style.is_empty()
            && self.image.is_none()
            && self.rows.iter().all(|r| r.kind == ChangeKind::Unchanged)
    }
}

/// Positions of a moved block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDetail {
    pub from: usize,
    pub to: usize,
}

/// Marker of a text diff span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanTag {
    Equal,
    Inserted,
    Deleted,
}

/// A span of a token-level text diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub tag: SpanTag,
    pub text: String,
}

impl TextSpan {
    pub fn new(tag: SpanTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }
}

/// Style attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleAttribute {
    Style,
    Alignment,
    Bold,
    Italic,
    Underline,
    FontName,
    FontSize,
    Color,
    TableStyle,
}

impl StyleAttribute {
    /// Name used in reports
    pub fn name(self) -> &'static str {
        match self {
            StyleAttribute::Style => "style",
            StyleAttribute::Alignment => "alignment",
            StyleAttribute::Bold => "bold",
            StyleAttribute::Italic => "italic",
            StyleAttribute::Underline => "underline",
            StyleAttribute::FontName => "font_name",
            StyleAttribute::FontSize => "font_size",
            StyleAttribute::Color => "color",
            StyleAttribute::TableStyle => "table_style",
        }
    }
}

impl fmt::Display for StyleAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One attribute-level style difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleChange {
    pub attribute: StyleAttribute,
    pub before: String,
    pub after: String,
    /// Affected text for run-level attributes
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

/// Coarse category of a paragraph modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditCategory {
    /// Same text, different formatting
    FormattingOnly,
    /// Same words in a different order
    WordOrder,
    /// Only words added
    TextAdded,
    /// Only words removed
    TextRemoved,
    /// Words added and removed, more than twice as many added
    SignificantAddition,
    /// Words added and removed, more than twice as many removed
    SignificantRemoval,
    /// Words both added and removed in similar amounts
    ContentChanged,
}

impl EditCategory {
    /// Label used in descriptions
    pub fn label(self) -> &'static str {
        match self {
            EditCategory::FormattingOnly => "Formatting only",
            EditCategory::WordOrder => "Word order changed",
            EditCategory::TextAdded => "Text added",
            EditCategory::TextRemoved => "Text removed",
            EditCategory::SignificantAddition => "Significant addition",
            EditCategory::SignificantRemoval => "Significant removal",
            EditCategory::ContentChanged => "Content changed",
        }
    }
}

/// Old and new properties of a modified image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDelta {
    pub before_hash: String,
    pub after_hash: String,
    pub before_size: String,
    pub after_size: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub before_alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub after_alt: Option<String>,
}

/// A row-level change inside a modified table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowChange {
    pub kind: ChangeKind,
    /// Row index in the before table
    pub before: Option<usize>,
    /// Row index in the after table
    pub after: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub similarity: Option<f64>,
    /// Cell changes of a matched row
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub cells: Vec<CellChange>,
}

/// A cell-level change inside a matched row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    /// Column position
    pub column: usize,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub before_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub after_text: Option<String>,
    /// Changes among the cell's nested blocks
    #[serde(skip_serializing_if = "ChangeSet::is_empty", default)]
    pub changes: ChangeSet,
}
