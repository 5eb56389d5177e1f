//! Document content parsing (word/document.xml)
//!
//! Produces the raw block structure of the body in reading order: paragraphs
//! with their runs and drawings, and tables with nested cell content. Style
//! references are kept unresolved; see [`crate::styles`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::properties::{get_attr, get_attr_local, ParagraphProperties, RunProperties};

/// A parsed document body
#[derive(Debug, Clone, Default)]
pub struct RawDocument {
    /// Body blocks in reading order
    pub blocks: Vec<RawBlock>,
}

/// Block-level elements
#[derive(Debug, Clone)]
pub enum RawBlock {
    Paragraph(RawParagraph),
    Table(RawTable),
}

/// A paragraph with direct formatting and inline content
#[derive(Debug, Clone, Default)]
pub struct RawParagraph {
    /// Direct paragraph properties, including the style reference
    pub properties: ParagraphProperties,
    /// Runs and drawings in order
    pub content: Vec<RawInline>,
}

/// Inline content of a paragraph
#[derive(Debug, Clone)]
pub enum RawInline {
    Run(RawRun),
    Drawing(RawDrawing),
}

/// A text run with direct formatting
#[derive(Debug, Clone, Default)]
pub struct RawRun {
    pub text: String,
    /// Direct run properties, including the character style reference
    pub properties: RunProperties,
}

/// A `w:drawing` element
#[derive(Debug, Clone, Default)]
pub struct RawDrawing {
    /// Relationship ID of the picture (`r:embed` or `r:link`)
    pub rel_id: Option<String>,
    /// Width in EMUs
    pub width_emu: Option<i64>,
    /// Height in EMUs
    pub height_emu: Option<i64>,
    /// Alt text from `wp:docPr@descr`
    pub alt: Option<String>,
}

/// A table
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Table style ID
    pub style_id: Option<String>,
    pub rows: Vec<RawRow>,
}

/// A table row
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

/// A table cell
#[derive(Debug, Clone, Default)]
pub struct RawCell {
    /// Nested paragraphs and tables
    pub blocks: Vec<RawBlock>,
}

impl RawDocument {
    /// Parse a document from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        // Don't trim text - preserve whitespace in runs
        reader.config_mut().trim_text(false);

        let mut parser = DocumentParser::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => parser.open(e, false),
                Ok(Event::Empty(ref e)) => parser.open(e, true),
                Ok(Event::End(ref e)) => parser.close(e.local_name().as_ref()),
                Ok(Event::Text(ref e)) => {
                    if parser.capturing_text() {
                        let text = e.unescape().map_err(ExtractionError::Xml)?;
                        parser.push_text(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractionError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(RawDocument {
            blocks: parser.blocks,
        })
    }

    /// Plain text of all top-level paragraphs, one per line
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                RawBlock::Paragraph(p) => Some(p.text()),
                RawBlock::Table(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl RawParagraph {
    /// Concatenated run text
    pub fn text(&self) -> String {
        self.runs().map(|r| r.text.as_str()).collect()
    }

    /// Iterate over runs
    pub fn runs(&self) -> impl Iterator<Item = &RawRun> {
        self.content.iter().filter_map(|c| match c {
            RawInline::Run(r) => Some(r),
            RawInline::Drawing(_) => None,
        })
    }

    /// Iterate over drawings
    pub fn drawings(&self) -> impl Iterator<Item = &RawDrawing> {
        self.content.iter().filter_map(|c| match c {
            RawInline::Drawing(d) => Some(d),
            RawInline::Run(_) => None,
        })
    }
}

/// Streaming parser state
#[derive(Default)]
struct DocumentParser {
    blocks: Vec<RawBlock>,
    in_body: bool,
    /// Open tables, innermost last
    tables: Vec<TableBuilder>,
    paragraph: Option<RawParagraph>,
    run: Option<RawRun>,
    drawing: Option<RawDrawing>,
    in_ppr: bool,
    in_rpr: bool,
    /// Inside `w:t` (visible text, as opposed to `w:instrText`)
    in_text: bool,
    /// Depth inside text boxes and markup-compatibility fallbacks
    skip_depth: u32,
}

#[derive(Default)]
struct TableBuilder {
    style_id: Option<String>,
    rows: Vec<RawRow>,
    row: Option<RawRow>,
    cell: Option<RawCell>,
}

/// Subtrees whose content is not part of the body text flow
fn is_skipped(name: &[u8]) -> bool {
    matches!(name, b"txbxContent" | b"Fallback")
}

impl DocumentParser {
    fn capturing_text(&self) -> bool {
        self.in_text && self.skip_depth == 0 && self.drawing.is_none()
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn open(&mut self, e: &BytesStart, empty: bool) {
        let local = e.local_name();
        let name = local.as_ref();

        if self.skip_depth > 0 {
            if !empty && is_skipped(name) {
                self.skip_depth += 1;
            }
            return;
        }

        match name {
            b"body" => self.in_body = true,
            b"txbxContent" | b"Fallback" => {
                if !empty {
                    self.skip_depth += 1;
                }
                return;
            }
            b"tbl" if self.in_body && self.paragraph.is_none() => {
                self.tables.push(TableBuilder::default());
            }
            b"tblStyle" if self.paragraph.is_none() => {
                if let Some(table) = self.tables.last_mut() {
                    table.style_id = get_attr(e, b"w:val");
                }
            }
            b"tr" if self.paragraph.is_none() => {
                if let Some(table) = self.tables.last_mut() {
                    table.row = Some(RawRow::default());
                }
            }
            b"tc" if self.paragraph.is_none() => {
                if let Some(table) = self.tables.last_mut() {
                    table.cell = Some(RawCell::default());
                }
            }
            b"p" if self.in_body && self.paragraph.is_none() => {
                self.paragraph = Some(RawParagraph::default());
            }
            b"pPr" if self.paragraph.is_some() && self.run.is_none() => self.in_ppr = true,
            b"rPr" if self.run.is_some() => self.in_rpr = true,
            b"r" if self.paragraph.is_some() && self.drawing.is_none() => {
                self.run = Some(RawRun::default());
            }
            b"t" if self.run.is_some() && self.drawing.is_none() => self.in_text = true,
            b"tab" | b"ptab" if self.run.is_some() && !self.in_rpr => self.push_text("\t"),
            b"br" | b"cr" if self.run.is_some() && !self.in_rpr => self.push_text("\n"),
            b"drawing" if self.paragraph.is_some() => {
                self.drawing = Some(RawDrawing::default());
            }
            b"extent" => {
                if let Some(drawing) = self.drawing.as_mut() {
                    if drawing.width_emu.is_none() {
                        drawing.width_emu = get_attr(e, b"cx").and_then(|v| v.parse().ok());
                        drawing.height_emu = get_attr(e, b"cy").and_then(|v| v.parse().ok());
                    }
                }
            }
            b"docPr" => {
                if let Some(drawing) = self.drawing.as_mut() {
                    drawing.alt = get_attr(e, b"descr").filter(|d| !d.is_empty());
                }
            }
            b"blip" => {
                if let Some(drawing) = self.drawing.as_mut() {
                    drawing.rel_id =
                        get_attr_local(e, b"embed").or_else(|| get_attr_local(e, b"link"));
                }
            }
            _ if self.in_rpr => {
                if let Some(run) = self.run.as_mut() {
                    run.properties.apply(e);
                }
            }
            _ if self.in_ppr => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.properties.apply(e);
                }
            }
            _ => {}
        }

        if empty {
            self.close(name);
        }
    }

    fn close(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            if is_skipped(name) {
                self.skip_depth -= 1;
            }
            return;
        }

        match name {
            b"body" => self.in_body = false,
            b"pPr" => self.in_ppr = false,
            b"rPr" => self.in_rpr = false,
            b"t" => self.in_text = false,
            b"r" if self.drawing.is_none() => {
                if let Some(run) = self.run.take() {
                    if let Some(paragraph) = self.paragraph.as_mut() {
                        if !run.text.is_empty() {
                            paragraph.content.push(RawInline::Run(run));
                        }
                    }
                }
            }
            b"drawing" => {
                if let Some(drawing) = self.drawing.take() {
                    if let Some(paragraph) = self.paragraph.as_mut() {
                        if drawing.rel_id.is_some() {
                            paragraph.content.push(RawInline::Drawing(drawing));
                        } else {
                            debug!("Skipping drawing without picture reference");
                        }
                    }
                }
            }
            b"p" => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.run = None;
                    self.in_ppr = false;
                    self.push_block(RawBlock::Paragraph(paragraph));
                }
            }
            b"tc" if self.paragraph.is_none() => {
                if let Some(table) = self.tables.last_mut() {
                    if let (Some(row), Some(cell)) = (table.row.as_mut(), table.cell.take()) {
                        row.cells.push(cell);
                    }
                }
            }
            b"tr" if self.paragraph.is_none() => {
                if let Some(table) = self.tables.last_mut() {
                    if let Some(row) = table.row.take() {
                        table.rows.push(row);
                    }
                }
            }
            b"tbl" if self.paragraph.is_none() => {
                if let Some(table) = self.tables.pop() {
                    self.push_block(RawBlock::Table(RawTable {
                        style_id: table.style_id,
                        rows: table.rows,
                    }));
                }
            }
            _ => {}
        }
    }

    /// Deliver a finished block to the innermost open cell, or the body
    fn push_block(&mut self, block: RawBlock) {
        match self.tables.last_mut() {
            Some(table) => match table.cell.as_mut() {
                Some(cell) => cell.blocks.push(block),
                None => debug!("Dropping block outside of a table cell"),
            },
            None => self.blocks.push(block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
            xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
            xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006">
  <w:body>{}</w:body>
</w:document>"#,
            body
        )
        .into_bytes()
    }

    fn paragraph(block: &RawBlock) -> &RawParagraph {
        match block {
            RawBlock::Paragraph(p) => p,
            other => panic!("Expected paragraph, got {:?}", other),
        }
    }

    fn table(block: &RawBlock) -> &RawTable {
        match block {
            RawBlock::Table(t) => t,
            other => panic!("Expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_paragraph() {
        let doc = RawDocument::parse(&wrap(r#"<w:p><w:r><w:t>Hello, world!</w:t></w:r></w:p>"#))
            .unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.plain_text(), "Hello, world!");
    }

    #[test]
    fn test_ignore_field_codes() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p>
                <w:r><w:fldChar w:fldCharType="begin"/></w:r>
                <w:r><w:instrText>TOC \o "1-3"</w:instrText></w:r>
                <w:r><w:fldChar w:fldCharType="separate"/></w:r>
                <w:r><w:t>Table of Contents</w:t></w:r>
                <w:r><w:fldChar w:fldCharType="end"/></w:r>
            </w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.plain_text(), "Table of Contents");
    }

    #[test]
    fn test_deleted_text_is_ignored() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p>
                <w:del w:id="1"><w:r><w:delText>old </w:delText></w:r></w:del>
                <w:ins w:id="2"><w:r><w:t>new</w:t></w:r></w:ins>
            </w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.plain_text(), "new");
    }

    #[test]
    fn test_whitespace_elements() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t xml:space="preserve"> c</w:t></w:r></w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.plain_text(), "a\tb\n c");
    }

    #[test]
    fn test_tab_stops_are_not_text() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.plain_text(), "x");
    }

    #[test]
    fn test_entities_unescaped() {
        let doc =
            RawDocument::parse(&wrap(r#"<w:p><w:r><w:t>R&amp;D &lt;team&gt;</w:t></w:r></w:p>"#))
                .unwrap();
        assert_eq!(doc.plain_text(), "R&D <team>");
    }

    #[test]
    fn test_paragraph_and_run_properties() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p>
                <w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/><w:rPr><w:i/></w:rPr></w:pPr>
                <w:r><w:rPr><w:b/><w:sz w:val="24"/></w:rPr><w:t>Bold</w:t></w:r>
                <w:r><w:t>Plain</w:t></w:r>
            </w:p>"#,
        ))
        .unwrap();

        let p = paragraph(&doc.blocks[0]);
        assert_eq!(p.properties.style_id.as_deref(), Some("Heading1"));
        assert_eq!(
            p.properties.alignment,
            Some(docdelta_model::Alignment::Center)
        );

        let runs: Vec<&RawRun> = p.runs().collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].properties.bold, Some(true));
        assert_eq!(runs[0].properties.font_size, Some(12.0));
        assert_eq!(runs[0].properties.italic, None, "paragraph mark formatting is not run formatting");
        assert_eq!(runs[1].properties, RunProperties::default());
    }

    #[test]
    fn test_bold_false_as_start_element() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p><w:r><w:rPr><w:b w:val="0"></w:b></w:rPr><w:t>Not bold</w:t></w:r></w:p>"#,
        ))
        .unwrap();
        let p = paragraph(&doc.blocks[0]);
        assert_eq!(p.runs().next().unwrap().properties.bold, Some(false));
    }

    #[test]
    fn test_hyperlink_runs_are_flattened() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p><w:r><w:t xml:space="preserve">See </w:t></w:r><w:hyperlink r:id="rId9"><w:r><w:t>docs</w:t></w:r></w:hyperlink></w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.plain_text(), "See docs");
        assert_eq!(paragraph(&doc.blocks[0]).runs().count(), 2);
    }

    #[test]
    fn test_parse_table() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:tbl>
                <w:tblPr><w:tblStyle w:val="TableGrid"/><w:jc w:val="center"/></w:tblPr>
                <w:tr><w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p></w:tc></w:tr>
                <w:tr><w:tc><w:p><w:r><w:t>A2</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr>
            </w:tbl>
            <w:p><w:r><w:t>After</w:t></w:r></w:p>"#,
        ))
        .unwrap();

        assert_eq!(doc.blocks.len(), 2);
        let t = table(&doc.blocks[0]);
        assert_eq!(t.style_id.as_deref(), Some("TableGrid"));
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].cells.len(), 2);
        assert_eq!(paragraph(&t.rows[0].cells[1].blocks[0]).text(), "B1");
        assert_eq!(t.rows[1].cells[1].blocks.len(), 1);
        assert_eq!(paragraph(&doc.blocks[1]).text(), "After");
    }

    #[test]
    fn test_parse_nested_table() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:tbl><w:tr><w:tc>
                <w:p><w:r><w:t>outer</w:t></w:r></w:p>
                <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
                <w:p/>
            </w:tc></w:tr></w:tbl>"#,
        ))
        .unwrap();

        assert_eq!(doc.blocks.len(), 1);
        let outer = table(&doc.blocks[0]);
        let cell = &outer.rows[0].cells[0];
        assert_eq!(cell.blocks.len(), 3);
        let inner = table(&cell.blocks[1]);
        assert_eq!(paragraph(&inner.rows[0].cells[0].blocks[0]).text(), "inner");
    }

    #[test]
    fn test_parse_drawing() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p><w:r><w:drawing><wp:inline>
                <wp:extent cx="952500" cy="476250"/>
                <wp:docPr id="1" name="Picture 1" descr="Architecture"/>
                <a:graphic><a:graphicData><a:blip r:embed="rId7"/><a:ext cx="1" cy="1"/></a:graphicData></a:graphic>
            </wp:inline></w:drawing></w:r></w:p>"#,
        ))
        .unwrap();

        let p = paragraph(&doc.blocks[0]);
        let drawings: Vec<&RawDrawing> = p.drawings().collect();
        assert_eq!(drawings.len(), 1);
        assert_eq!(drawings[0].rel_id.as_deref(), Some("rId7"));
        assert_eq!(drawings[0].width_emu, Some(952500));
        assert_eq!(drawings[0].height_emu, Some(476250));
        assert_eq!(drawings[0].alt.as_deref(), Some("Architecture"));
        assert_eq!(p.runs().count(), 0);
    }

    #[test]
    fn test_drawing_without_blip_is_dropped() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p><w:r><w:drawing><wp:inline><wp:extent cx="1" cy="1"/></wp:inline></w:drawing></w:r></w:p>"#,
        ))
        .unwrap();
        assert_eq!(paragraph(&doc.blocks[0]).drawings().count(), 0);
    }

    #[test]
    fn test_textbox_and_fallback_are_skipped() {
        let doc = RawDocument::parse(&wrap(
            r#"<w:p>
                <w:r><w:t>Body</w:t></w:r>
                <w:r><mc:AlternateContent>
                    <mc:Choice Requires="wps"><w:drawing><wp:anchor><wp:extent cx="10" cy="10"/>
                        <w:txbxContent><w:p><w:r><w:t>Boxed</w:t></w:r></w:p></w:txbxContent>
                    </wp:anchor></w:drawing></mc:Choice>
                    <mc:Fallback><w:pict><w:p><w:r><w:t>Legacy</w:t></w:r></w:p></w:pict></mc:Fallback>
                </mc:AlternateContent></w:r>
            </w:p>"#,
        ))
        .unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.plain_text(), "Body");
    }

    #[test]
    fn test_empty_document() {
        let doc = RawDocument::parse(&wrap("")).unwrap();
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        let result = RawDocument::parse(b"<w:document><w:body><w:p></w:body>");
        assert!(matches!(result, Err(ExtractionError::Xml(_))));
    }
}
