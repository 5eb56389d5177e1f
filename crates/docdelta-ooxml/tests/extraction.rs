//! Extraction Tests
//!
//! End-to-end tests from DOCX files on disk to the document model.
//!
//! Test Categories:
//! 1. File validation - extension, size, container format
//! 2. Document structure - block order, nesting, captions
//! 3. Formatting - style inheritance and heading detection

use docdelta_model::{BlockKind, BlockVariant};
use docdelta_ooxml::test_utils::{drawing_xml, styled_paragraph_xml, table_xml, DocxBuilder};
use docdelta_ooxml::{ExtractOptions, ExtractionError, Extractor};
use tempfile::TempDir;

// =============================================================================
// PART 1: FILE VALIDATION
// =============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_extract_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.docx");
        DocxBuilder::new()
            .paragraph("Hello")
            .write_to(&path)
            .unwrap();

        let model = docdelta_ooxml::extract_file(&path).unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.plain_text(), "Hello");
    }

    #[test]
    fn test_docm_extension_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("macro.DOCM");
        DocxBuilder::new().paragraph("x").write_to(&path).unwrap();

        assert!(Extractor::default().extract_file(&path).is_ok());
    }

    #[test]
    fn test_wrong_extension_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.odt");
        DocxBuilder::new().paragraph("x").write_to(&path).unwrap();

        let err = Extractor::default().extract_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Unsupported(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Extractor::default()
            .extract_file(dir.path().join("absent.docx"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "plain text pretending to be a document").unwrap();

        let err = Extractor::default().extract_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Archive(_)));
    }

    #[test]
    fn test_size_limit_checked_before_reading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.docx");
        DocxBuilder::new().paragraph("x").write_to(&path).unwrap();

        let options = ExtractOptions {
            max_file_size_mb: 0,
            ..Default::default()
        };
        let err = Extractor::new(options).extract_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::FileTooLarge { .. }));
    }
}

// =============================================================================
// PART 2: DOCUMENT STRUCTURE
// =============================================================================

mod structure_tests {
    use super::*;

    fn sample() -> DocxBuilder {
        DocxBuilder::new()
            .image("rId7", "media/chart.png", b"chart-v1")
            .paragraph("Introduction")
            .paragraph("Table 1: Budget")
            .body(&table_xml(&[&["Item", "Cost"], &["Server", "1000"]]))
            .paragraph("Figure 1: Chart")
            .body(&drawing_xml("rId7", "Quarterly chart"))
            .paragraph("Conclusion")
    }

    #[test]
    fn test_block_sequence() {
        let docx = sample().build().unwrap();
        let model = Extractor::default().extract_bytes(&docx).unwrap();

        let variants: Vec<_> = model.blocks.iter().map(|b| b.variant()).collect();
        assert_eq!(
            variants,
            vec![
                BlockVariant::Paragraph,
                BlockVariant::Paragraph,
                BlockVariant::Table,
                BlockVariant::Paragraph,
                BlockVariant::Image,
                BlockVariant::Paragraph,
            ]
        );
        for (i, block) in model.blocks.iter().enumerate() {
            assert_eq!(block.index, i);
        }
        assert_eq!(model.table_count(), 1);
        assert_eq!(model.image_count(), 1);
    }

    #[test]
    fn test_captions_attached() {
        let docx = sample().build().unwrap();
        let model = Extractor::default().extract_bytes(&docx).unwrap();

        match &model.blocks[2].kind {
            BlockKind::Table(t) => assert_eq!(t.caption.as_deref(), Some("Table 1: Budget")),
            other => panic!("Expected table, got {:?}", other),
        }
        match &model.blocks[4].kind {
            BlockKind::Image(img) => {
                assert_eq!(img.caption.as_deref(), Some("Figure 1: Chart"));
                assert_eq!(img.alt_text.as_deref(), Some("Quarterly chart"));
            }
            other => panic!("Expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_caption_does_not_change_fingerprint() {
        let with_caption = DocxBuilder::new()
            .paragraph("Table 1: Budget")
            .body(&table_xml(&[&["a"]]))
            .build()
            .unwrap();
        let without_caption = DocxBuilder::new()
            .paragraph("Budget")
            .body(&table_xml(&[&["a"]]))
            .build()
            .unwrap();

        let a = Extractor::default().extract_bytes(&with_caption).unwrap();
        let b = Extractor::default().extract_bytes(&without_caption).unwrap();
        assert_eq!(a.blocks[1].fingerprint, b.blocks[1].fingerprint);
    }

    #[test]
    fn test_same_media_same_fingerprint() {
        let build = |alt: &str| {
            DocxBuilder::new()
                .image("rId7", "media/chart.png", b"chart-v1")
                .body(&drawing_xml("rId7", alt))
                .build()
                .unwrap()
        };
        let a = Extractor::default().extract_bytes(&build("chart")).unwrap();
        let b = Extractor::default().extract_bytes(&build("chart")).unwrap();
        let c = Extractor::default().extract_bytes(&build("other")).unwrap();

        assert_eq!(a.blocks[0].fingerprint, b.blocks[0].fingerprint);
        assert_ne!(a.blocks[0].fingerprint, c.blocks[0].fingerprint);
    }

    #[test]
    fn test_nested_table_inside_cell() {
        let inner = table_xml(&[&["inner"]]);
        let outer = format!("<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>", inner);
        let docx = DocxBuilder::new().body(&outer).build().unwrap();
        let model = Extractor::default().extract_bytes(&docx).unwrap();

        assert_eq!(model.len(), 1);
        match &model.blocks[0].kind {
            BlockKind::Table(t) => {
                let cell = &t.rows[0].cells[0];
                assert_eq!(cell.blocks.len(), 1);
                assert_eq!(cell.blocks[0].variant(), BlockVariant::Table);
                assert_eq!(cell.text(), "inner");
            }
            other => panic!("Expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_table_limit_counts_nested_tables() {
        let inner = table_xml(&[&["inner"]]);
        let outer = format!("<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>", inner);
        let docx = DocxBuilder::new().body(&outer).build().unwrap();
        let options = ExtractOptions {
            max_tables: 1,
            ..Default::default()
        };

        let err = Extractor::new(options).extract_bytes(&docx).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::LimitExceeded { what: "tables", .. }
        ));
    }
}

// =============================================================================
// PART 3: FORMATTING AND HEADINGS
// =============================================================================

mod formatting_tests {
    use super::*;

    const STYLES: &str = r#"
<w:docDefaults>
  <w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman"/><w:sz w:val="24"/></w:rPr></w:rPrDefault>
</w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="CorpH1">
  <w:name w:val="Corp Chapter"/>
  <w:basedOn w:val="Normal"/>
  <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
  <w:rPr><w:b/><w:color w:val="1F3864"/></w:rPr>
</w:style>
<w:style w:type="paragraph" w:styleId="CorpH2">
  <w:name w:val="Corp Section"/>
  <w:basedOn w:val="CorpH1"/>
  <w:pPr><w:outlineLvl w:val="1"/></w:pPr>
</w:style>"#;

    #[test]
    fn test_custom_template_headings() {
        let docx = DocxBuilder::new()
            .styles(STYLES)
            .body(&styled_paragraph_xml("CorpH1", "Scope"))
            .body(&styled_paragraph_xml("CorpH2", "Goals"))
            .paragraph("Body")
            .build()
            .unwrap();
        let model = Extractor::default().extract_bytes(&docx).unwrap();

        assert_eq!(model.section_path(2), "Scope > Goals");
        match &model.blocks[1].kind {
            BlockKind::Paragraph(p) => {
                assert_eq!(p.heading_level, Some(2));
                assert_eq!(p.style, "Corp Section");
                assert!(p.runs[0].bold);
                assert_eq!(p.runs[0].color.as_deref(), Some("1F3864"));
                assert_eq!(p.runs[0].font_name.as_deref(), Some("Times New Roman"));
                assert_eq!(p.runs[0].font_size, Some(12.0));
            }
            other => panic!("Expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_direct_formatting_overrides_style() {
        let body = r#"<w:p><w:pPr><w:pStyle w:val="CorpH1"/><w:jc w:val="right"/></w:pPr><w:r><w:rPr><w:b w:val="0"/><w:i/></w:rPr><w:t>Plain</w:t></w:r></w:p>"#;
        let docx = DocxBuilder::new().styles(STYLES).body(body).build().unwrap();
        let model = Extractor::default().extract_bytes(&docx).unwrap();

        match &model.blocks[0].kind {
            BlockKind::Paragraph(p) => {
                assert_eq!(p.alignment, docdelta_model::Alignment::Right);
                assert!(!p.runs[0].bold);
                assert!(p.runs[0].italic);
            }
            other => panic!("Expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_styles_part_uses_defaults() {
        let docx = DocxBuilder::new()
            .body(&styled_paragraph_xml("Unknown", "Text"))
            .build()
            .unwrap();
        let model = Extractor::default().extract_bytes(&docx).unwrap();

        match &model.blocks[0].kind {
            BlockKind::Paragraph(p) => {
                assert_eq!(p.heading_level, None);
                assert!(!p.runs[0].bold);
            }
            other => panic!("Expected paragraph, got {:?}", other),
        }
    }
}
