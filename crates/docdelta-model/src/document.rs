//! Document model definitions
//!
//! A [`DocumentModel`] is the normalized, comparable tree extracted from one
//! document snapshot: blocks in reading order, each with effective (already
//! resolved) formatting and a content fingerprint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fingerprint::{Fingerprint, FingerprintBuilder};

/// One parsed document version
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Blocks in reading order
    pub blocks: Vec<Block>,
}

/// A block together with its position and fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position within the owning sequence (document or cell)
    pub index: usize,
    /// Content fingerprint
    pub fingerprint: Fingerprint,
    /// Block content
    pub kind: BlockKind,
}

/// Block content variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    /// A paragraph of text runs
    Paragraph(Paragraph),
    /// A table
    Table(Table),
    /// An embedded image
    Image(Image),
}

/// Field-less tag of a [`BlockKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockVariant {
    Paragraph,
    Table,
    Image,
}

/// A paragraph with effective formatting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in order
    pub runs: Vec<Run>,
    /// Resolved paragraph style name (display name, not style ID)
    pub style: String,
    /// Effective alignment
    pub alignment: Alignment,
    /// Heading level (1-9) when the paragraph acts as a heading
    pub heading_level: Option<u8>,
}

/// A run of text with effective formatting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Font family name
    pub font_name: Option<String>,
    /// Font size in points
    pub font_size: Option<f32>,
    /// Text color as RRGGBB hex
    pub color: Option<String>,
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table rows
    pub rows: Vec<Row>,
    /// Resolved table style name
    pub style: Option<String>,
    /// Caption found near the table (not part of the fingerprint)
    pub caption: Option<String>,
}

/// A table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Cells in this row
    pub cells: Vec<Cell>,
    /// Fingerprint over all cell contents
    pub fingerprint: Fingerprint,
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Nested blocks, indexed relative to the cell
    pub blocks: Vec<Block>,
}

/// An embedded image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    /// Identity of the image content (`sha256:...`)
    pub content_hash: String,
    /// Display width in pixels
    pub width: Option<u32>,
    /// Display height in pixels
    pub height: Option<u32>,
    /// Alternative text
    pub alt_text: Option<String>,
    /// Caption found near the image (not part of the fingerprint)
    pub caption: Option<String>,
}

impl DocumentModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from block contents, assigning indices and fingerprints
    pub fn from_kinds(kinds: Vec<BlockKind>) -> Self {
        Self {
            blocks: index_blocks(kinds),
        }
    }

    /// Number of top-level blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the model has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get a block by index
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Number of top-level paragraphs
    pub fn paragraph_count(&self) -> usize {
        self.count_variant(BlockVariant::Paragraph)
    }

    /// Number of top-level tables
    pub fn table_count(&self) -> usize {
        self.count_variant(BlockVariant::Table)
    }

    /// Number of top-level images
    pub fn image_count(&self) -> usize {
        self.count_variant(BlockVariant::Image)
    }

    fn count_variant(&self, variant: BlockVariant) -> usize {
        self.blocks.iter().filter(|b| b.variant() == variant).count()
    }

    /// Plain text of the whole document, blocks separated by blank lines
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Heading breadcrumb in force at `index`
    ///
    /// Returns an empty string when no heading precedes the block.
    pub fn section_path(&self, index: usize) -> String {
        let mut stack: Vec<(u8, String)> = Vec::new();

        for block in self.blocks.iter().take(index.saturating_add(1)) {
            if let BlockKind::Paragraph(p) = &block.kind {
                if let Some(level) = p.heading_level {
                    while stack.last().is_some_and(|(l, _)| *l >= level) {
                        stack.pop();
                    }
                    stack.push((level, p.text().trim().to_string()));
                }
            }
        }

        stack
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

/// Assign indices and fingerprints to a sequence of block contents
fn index_blocks(kinds: Vec<BlockKind>) -> Vec<Block> {
    kinds
        .into_iter()
        .enumerate()
        .map(|(index, kind)| Block::new(index, kind))
        .collect()
}

impl Block {
    /// Create a block, computing its fingerprint from the content
    pub fn new(index: usize, kind: BlockKind) -> Self {
        Self {
            index,
            fingerprint: kind.fingerprint(),
            kind,
        }
    }

    /// The block's variant tag
    pub fn variant(&self) -> BlockVariant {
        self.kind.variant()
    }

    /// Plain text of this block
    pub fn plain_text(&self) -> String {
        self.kind.plain_text()
    }
}

impl BlockKind {
    /// The field-less variant tag
    pub fn variant(&self) -> BlockVariant {
        match self {
            BlockKind::Paragraph(_) => BlockVariant::Paragraph,
            BlockKind::Table(_) => BlockVariant::Table,
            BlockKind::Image(_) => BlockVariant::Image,
        }
    }

    /// Compute the content fingerprint
    pub fn fingerprint(&self) -> Fingerprint {
        match self {
            BlockKind::Paragraph(p) => p.fingerprint(),
            BlockKind::Table(t) => t.fingerprint(),
            BlockKind::Image(i) => i.fingerprint(),
        }
    }

    /// Plain text (alt text for images)
    pub fn plain_text(&self) -> String {
        match self {
            BlockKind::Paragraph(p) => p.text(),
            BlockKind::Table(t) => t.plain_text(),
            BlockKind::Image(i) => i.alt_text.clone().unwrap_or_default(),
        }
    }
}

impl BlockVariant {
    /// Lowercase name used in reports
    pub fn name(self) -> &'static str {
        match self {
            BlockVariant::Paragraph => "paragraph",
            BlockVariant::Table => "table",
            BlockVariant::Image => "image",
        }
    }
}

impl fmt::Display for BlockVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Paragraph {
    /// Create an empty paragraph with the given style
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            ..Default::default()
        }
    }

    /// Create a single-run paragraph in the `Normal` style
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new("Normal").with_run(Run::new(text))
    }

    /// Append a run
    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    /// Set the alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Mark the paragraph as a heading
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = Some(level);
        self
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if the paragraph has no visible text
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Runs with adjacent identically formatted runs merged
    ///
    /// Word splits runs arbitrarily (spell check, revision ids); merged runs
    /// make two renderings of the same text and formatting compare equal.
    pub fn coalesced_runs(&self) -> Vec<Run> {
        let mut merged: Vec<Run> = Vec::new();
        for run in self.runs.iter().filter(|r| !r.text.is_empty()) {
            match merged.last_mut() {
                Some(last) if last.same_format(run) => last.text.push_str(&run.text),
                _ => merged.push(run.clone()),
            }
        }
        merged
    }

    fn fingerprint(&self) -> Fingerprint {
        let runs = self.coalesced_runs();
        let mut builder = FingerprintBuilder::new("paragraph")
            .str(&self.style)
            .str(self.alignment.name())
            .u64(runs.len() as u64);
        for run in &runs {
            builder = run.write_fingerprint(builder);
        }
        builder.finish()
    }
}

impl Run {
    /// Create an unformatted run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set bold
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set italic
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Set underline
    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Set the font family
    pub fn with_font(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    /// Set the font size in points
    pub fn with_size(mut self, points: f32) -> Self {
        self.font_size = Some(points);
        self
    }

    /// Set the text color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Check if two runs carry identical formatting
    pub fn same_format(&self, other: &Run) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.font_name == other.font_name
            && self.font_size == other.font_size
            && self.color == other.color
    }

    fn write_fingerprint(&self, builder: FingerprintBuilder) -> FingerprintBuilder {
        let size = self.font_size.map(|s| format!("{}", s));
        builder
            .str(&self.text)
            .bool(self.bold)
            .bool(self.italic)
            .bool(self.underline)
            .opt_str(self.font_name.as_deref())
            .opt_str(size.as_deref())
            .opt_str(self.color.as_deref())
    }
}

impl Alignment {
    /// Lowercase name used in reports and fingerprints
    pub fn name(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Parse a WordprocessingML `w:jc` value
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "distribute" | "justify" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Table {
    /// Create a table from rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Set the table style
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Plain text: cells separated by tabs, rows by newlines
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn fingerprint(&self) -> Fingerprint {
        let mut builder = FingerprintBuilder::new("table")
            .opt_str(self.style.as_deref())
            .u64(self.rows.len() as u64);
        for row in &self.rows {
            builder = builder.child(&row.fingerprint);
        }
        builder.finish()
    }
}

impl Row {
    /// Create a row, fingerprinting its cells
    pub fn new(cells: Vec<Cell>) -> Self {
        let mut builder = FingerprintBuilder::new("row").u64(cells.len() as u64);
        for cell in &cells {
            builder = builder.child(&cell.fingerprint());
        }
        Self {
            fingerprint: builder.finish(),
            cells,
        }
    }

    /// Convenience constructor for rows of single-paragraph cells
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Cell::new(vec![BlockKind::Paragraph(Paragraph::plain(t.as_ref()))]))
                .collect(),
        )
    }

    /// Cell texts joined by tabs
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

impl Cell {
    /// Create a cell from block contents, assigning cell-relative indices
    pub fn new(kinds: Vec<BlockKind>) -> Self {
        Self {
            blocks: index_blocks(kinds),
        }
    }

    /// Cell text, nested blocks separated by newlines
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// Fingerprint over the nested blocks
    pub fn fingerprint(&self) -> Fingerprint {
        let mut builder = FingerprintBuilder::new("cell").u64(self.blocks.len() as u64);
        for block in &self.blocks {
            builder = builder.child(&block.fingerprint);
        }
        builder.finish()
    }
}

impl Image {
    /// Create an image with the given content hash
    pub fn new(content_hash: impl Into<String>) -> Self {
        Self {
            content_hash: content_hash.into(),
            ..Default::default()
        }
    }

    /// Set display dimensions in pixels
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the alternative text
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt_text = Some(alt.into());
        self
    }

    /// `WIDTHxHEIGHT`, or `?` for unknown dimensions
    pub fn size_label(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "?".to_string(),
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        FingerprintBuilder::new("image")
            .str(&self.content_hash)
            .u64(self.width.map(u64::from).unwrap_or(u64::MAX))
            .u64(self.height.map(u64::from).unwrap_or(u64::MAX))
            .opt_str(self.alt_text.as_deref())
            .finish()
    }
}
