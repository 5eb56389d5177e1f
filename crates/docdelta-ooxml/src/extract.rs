//! DOCX to document model extraction
//!
//! [`Extractor`] validates the input, unpacks the container, resolves styles
//! and relationships, and converts the raw body into a
//! [`DocumentModel`] whose runs carry effective formatting.
//!
//! Image blocks: a paragraph that holds only pictures yields only
//! [`BlockKind::Image`] blocks; a paragraph with text and pictures yields the
//! paragraph followed by its images.

use std::path::Path;

use docdelta_model::{BlockKind, Cell, DocumentModel, Paragraph, Row, Table};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::archive::OoxmlArchive;
use crate::document::{RawBlock, RawDocument, RawParagraph, RawTable};
use crate::error::{ExtractionError, Result};
use crate::heading::detect_heading_level;
use crate::image::resolve_image;
use crate::relationships::Relationships;
use crate::styles::{resolve_effective_style, StyleSheet};

/// Extensions accepted by [`Extractor::extract_file`]
pub const SUPPORTED_EXTENSIONS: &[&str] = &["docx", "docm"];

/// Signature of OLE compound files (legacy `.doc`, encrypted OOXML)
const CFB_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Extraction limits and caption detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Maximum input size in megabytes
    pub max_file_size_mb: u64,
    /// Maximum number of paragraphs, nested ones included
    pub max_paragraphs: usize,
    /// Maximum number of tables, nested ones included
    pub max_tables: usize,
    /// Maximum number of images
    pub max_images: usize,
    /// Drop paragraphs without visible text or pictures
    pub skip_empty_paragraphs: bool,
    /// Paragraph prefixes that mark a table or figure caption
    pub caption_prefixes: Vec<String>,
    /// How many blocks before a table or image to search for its caption
    pub caption_search_distance: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_paragraphs: 10_000,
            max_tables: 1_000,
            max_images: 500,
            skip_empty_paragraphs: true,
            caption_prefixes: [
                "Table", "Figure", "Fig.", "Таблица", "Табл.", "Рисунок", "Рис.",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            caption_search_distance: 3,
        }
    }
}

impl ExtractOptions {
    /// Size limit in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Builds document models from DOCX containers
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor with the given options
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// The options in use
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Validate and extract a DOCX file
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<DocumentModel> {
        let path = path.as_ref();
        info!("Extracting {}", path.display());

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ExtractionError::Unsupported(format!(
                "expected a .docx or .docm file, got '{}'",
                path.display()
            )));
        }

        let size = std::fs::metadata(path)?.len();
        self.check_size(size)?;

        let bytes = std::fs::read(path)?;
        self.extract_bytes(&bytes)
    }

    /// Extract an in-memory DOCX file
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<DocumentModel> {
        self.check_size(bytes.len() as u64)?;
        if bytes.starts_with(CFB_SIGNATURE) {
            return Err(ExtractionError::Unsupported(
                "legacy binary or encrypted document".to_string(),
            ));
        }

        let archive = OoxmlArchive::from_bytes(bytes)?;
        self.extract_archive(&archive)
    }

    /// Extract from an unpacked container
    pub fn extract_archive(&self, archive: &OoxmlArchive) -> Result<DocumentModel> {
        let raw = RawDocument::parse(archive.document_xml()?)?;
        let styles = match archive.styles_xml() {
            Some(xml) => StyleSheet::parse(xml)?,
            None => StyleSheet::default(),
        };
        let rels = match archive.document_rels_xml() {
            Some(xml) => Relationships::parse(xml)?,
            None => Relationships::new(),
        };
        debug!(
            "Parsed {} raw blocks, {} styles, {} relationships",
            raw.blocks.len(),
            styles.len(),
            rels.len()
        );

        let mut converter = Converter {
            archive,
            styles: &styles,
            rels: &rels,
            options: &self.options,
            counts: Counts::default(),
        };
        let mut kinds = converter.convert_blocks(&raw.blocks)?;
        attach_captions(&mut kinds, &self.options);

        let model = DocumentModel::from_kinds(kinds);
        info!(
            "Extracted {} blocks ({} paragraphs, {} tables, {} images)",
            model.len(),
            model.paragraph_count(),
            model.table_count(),
            model.image_count()
        );
        Ok(model)
    }

    fn check_size(&self, size: u64) -> Result<()> {
        let limit = self.options.max_file_size_bytes();
        if size > limit {
            return Err(ExtractionError::FileTooLarge { size, limit });
        }
        Ok(())
    }
}

/// Extract a DOCX file with default options
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<DocumentModel> {
    Extractor::default().extract_file(path)
}

#[derive(Debug, Default)]
struct Counts {
    paragraphs: usize,
    tables: usize,
    images: usize,
}

#[derive(Debug, Clone, Copy)]
enum Counted {
    Paragraph,
    Table,
    Image,
}

impl Counts {
    /// Count one more block, failing as soon as its limit is passed
    fn add(&mut self, block: Counted, options: &ExtractOptions) -> Result<()> {
        let (what, count, limit) = match block {
            Counted::Paragraph => ("paragraphs", &mut self.paragraphs, options.max_paragraphs),
            Counted::Table => ("tables", &mut self.tables, options.max_tables),
            Counted::Image => ("images", &mut self.images, options.max_images),
        };
        *count += 1;
        if *count > limit {
            return Err(ExtractionError::LimitExceeded {
                what,
                count: *count,
                limit,
            });
        }
        Ok(())
    }
}

struct Converter<'a> {
    archive: &'a OoxmlArchive,
    styles: &'a StyleSheet,
    rels: &'a Relationships,
    options: &'a ExtractOptions,
    counts: Counts,
}

impl Converter<'_> {
    fn convert_blocks(&mut self, raw: &[RawBlock]) -> Result<Vec<BlockKind>> {
        let mut kinds = Vec::with_capacity(raw.len());
        for block in raw {
            match block {
                RawBlock::Paragraph(p) => self.convert_paragraph(p, &mut kinds)?,
                RawBlock::Table(t) => {
                    let table = self.convert_table(t)?;
                    kinds.push(BlockKind::Table(table));
                }
            }
        }
        Ok(kinds)
    }

    fn convert_paragraph(&mut self, raw: &RawParagraph, out: &mut Vec<BlockKind>) -> Result<()> {
        let style_id = raw.properties.style_id.as_deref();

        let runs: Vec<_> = raw
            .runs()
            .map(|r| resolve_effective_style(r, style_id, self.styles).into_run(r.text.as_str()))
            .collect();

        let mut props = self.styles.paragraph_properties(style_id);
        props.overlay(&raw.properties);

        let style = self.styles.display_name(style_id);
        let heading_level = detect_heading_level(&style, props.outline_level, &runs);
        let paragraph = Paragraph {
            runs,
            style,
            alignment: self.styles.effective_alignment(&raw.properties),
            heading_level,
        };

        let has_drawings = raw.drawings().next().is_some();
        let keep = !paragraph.is_empty() || (!has_drawings && !self.options.skip_empty_paragraphs);
        if keep {
            self.counts.add(Counted::Paragraph, self.options)?;
            out.push(BlockKind::Paragraph(paragraph));
        }

        for drawing in raw.drawings() {
            self.counts.add(Counted::Image, self.options)?;
            let image = resolve_image(drawing, self.rels, self.archive)?;
            out.push(BlockKind::Image(image));
        }
        Ok(())
    }

    fn convert_table(&mut self, raw: &RawTable) -> Result<Table> {
        self.counts.add(Counted::Table, self.options)?;

        let mut rows = Vec::with_capacity(raw.rows.len());
        for raw_row in &raw.rows {
            let mut cells = Vec::with_capacity(raw_row.cells.len());
            for raw_cell in &raw_row.cells {
                cells.push(Cell::new(self.convert_blocks(&raw_cell.blocks)?));
            }
            rows.push(Row::new(cells));
        }

        Ok(Table {
            rows,
            style: raw
                .style_id
                .as_deref()
                .map(|id| self.styles.table_style_name(id)),
            caption: None,
        })
    }
}

/// Attach the nearest preceding caption paragraph to tables and images
fn attach_captions(kinds: &mut [BlockKind], options: &ExtractOptions) {
    for i in 0..kinds.len() {
        if matches!(kinds[i], BlockKind::Paragraph(_)) {
            continue;
        }

        let start = i.saturating_sub(options.caption_search_distance);
        let caption = kinds[start..i].iter().rev().find_map(|k| match k {
            BlockKind::Paragraph(p) => {
                let text = p.text();
                let text = text.trim();
                is_caption(text, &options.caption_prefixes).then(|| text.to_string())
            }
            _ => None,
        });

        match &mut kinds[i] {
            BlockKind::Table(t) => t.caption = caption,
            BlockKind::Image(img) => img.caption = caption,
            BlockKind::Paragraph(_) => {}
        }
    }
}

/// Whether `text` starts with a caption prefix as a whole word
pub fn is_caption(text: &str, prefixes: &[String]) -> bool {
    let lower = text.to_lowercase();
    prefixes.iter().any(|prefix| {
        let prefix = prefix.to_lowercase();
        match lower.strip_prefix(prefix.as_str()) {
            Some(rest) => {
                prefix.ends_with('.')
                    || rest
                        .chars()
                        .next()
                        .map_or(true, |c| c.is_whitespace() || c.is_ascii_digit())
            }
            None => false,
        }
    })
}
