//! Shared test utilities for docdelta-ooxml
//!
//! Builds small but valid DOCX containers in memory so extraction and
//! comparison can be tested without fixture files.
//!
//! # Example
//! ```
//! use docdelta_ooxml::test_utils::{paragraph_xml, DocxBuilder};
//!
//! let docx = DocxBuilder::new().body(&paragraph_xml("Hello")).build()?;
//! assert!(!docx.is_empty());
//! # Ok::<(), docdelta_ooxml::ExtractionError>(())
//! ```

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::error::Result;

const TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const DOCUMENT_NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#,
);

struct Relationship {
    id: String,
    target: String,
    external: bool,
}

/// In-memory DOCX builder
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    styles: Option<String>,
    relationships: Vec<Relationship>,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    /// Start an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw body XML (`w:p`, `w:tbl`, ...)
    pub fn body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Append a plain paragraph
    pub fn paragraph(self, text: &str) -> Self {
        self.body(&paragraph_xml(text))
    }

    /// Set the content of `word/styles.xml` (inner XML of `w:styles`)
    pub fn styles(mut self, xml: &str) -> Self {
        self.styles = Some(xml.to_string());
        self
    }

    /// Add an embedded image part with its relationship
    pub fn image(mut self, rel_id: &str, target: &str, bytes: &[u8]) -> Self {
        self.relationships.push(Relationship {
            id: rel_id.to_string(),
            target: target.to_string(),
            external: false,
        });
        self.media
            .push((format!("word/{}", target), bytes.to_vec()));
        self
    }

    /// Add a linked (external) image relationship
    pub fn external_image(mut self, rel_id: &str, url: &str) -> Self {
        self.relationships.push(Relationship {
            id: rel_id.to_string(),
            target: url.to_string(),
            external: true,
        });
        self
    }

    /// Add an image relationship whose media part is missing
    pub fn dangling_image(mut self, rel_id: &str, target: &str) -> Self {
        self.relationships.push(Relationship {
            id: rel_id.to_string(),
            target: target.to_string(),
            external: false,
        });
        self
    }

    /// Produce the DOCX bytes
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
        )?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        )?;

        zip.start_file("word/_rels/document.xml.rels", options)?;
        zip.write_all(self.relationships_xml().as_bytes())?;

        if let Some(styles) = &self.styles {
            zip.start_file("word/styles.xml", options)?;
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:styles>"#,
                    styles
                )
                .as_bytes(),
            )?;
        }

        for (path, bytes) in &self.media {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        zip.start_file("word/document.xml", options)?;
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document {}><w:body>{}</w:body></w:document>"#,
                DOCUMENT_NAMESPACES, self.body
            )
            .as_bytes(),
        )?;

        zip.finish()?;
        Ok(buffer.into_inner())
    }

    /// Write the DOCX to a file
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.build()?)?;
        Ok(())
    }

    fn relationships_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.relationships {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                rel.id,
                TYPE_IMAGE,
                escape_xml(&rel.target),
                if rel.external {
                    r#" TargetMode="External""#
                } else {
                    ""
                }
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// A single-run paragraph
pub fn paragraph_xml(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    )
}

/// A single-run paragraph with a paragraph style
pub fn styled_paragraph_xml(style_id: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        style_id,
        escape_xml(text)
    )
}

/// A single-run bold paragraph
pub fn bold_paragraph_xml(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    )
}

/// A table of single-paragraph cells
pub fn table_xml(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in row.iter() {
            xml.push_str("<w:tc>");
            xml.push_str(&paragraph_xml(cell));
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

/// A paragraph holding one inline picture, 100x50 px
pub fn drawing_xml(rel_id: &str, alt: &str) -> String {
    format!(
        r#"<w:p><w:r><w:drawing><wp:inline><wp:extent cx="952500" cy="476250"/><wp:docPr id="1" name="Picture" descr="{}"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="{}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        escape_xml(alt),
        rel_id
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
