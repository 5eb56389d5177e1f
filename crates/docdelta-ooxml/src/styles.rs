//! Style definitions parsing (word/styles.xml)
//!
//! Styles are resolved once during extraction. After
//! [`resolve_effective_style`] every run carries plain attribute values, so
//! comparison never needs inheritance lookups.

use std::collections::{HashMap, HashSet};

use docdelta_model::{Alignment, Run};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::RawRun;
use crate::error::{ExtractionError, Result};
use crate::properties::{get_attr, ParagraphProperties, RunProperties};

/// Name reported for paragraphs without any resolvable style
pub const DEFAULT_STYLE_NAME: &str = "Normal";

/// Collection of styles from a document
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    /// All styles, keyed by style ID
    styles: HashMap<String, Style>,
    /// Default paragraph style ID
    pub default_paragraph: Option<String>,
    /// Default character style ID
    pub default_character: Option<String>,
    /// Document-wide run defaults (`w:docDefaults/w:rPrDefault`)
    pub run_defaults: RunProperties,
    /// Document-wide paragraph defaults (`w:docDefaults/w:pPrDefault`)
    pub paragraph_defaults: ParagraphProperties,
}

/// A Word style definition
#[derive(Debug, Clone)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    /// Style type
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
    /// Run formatting defined by this style
    pub run: RunProperties,
    /// Paragraph formatting defined by this style
    pub paragraph: ParagraphProperties,
}

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

/// Effective character formatting of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
}

impl ResolvedStyle {
    /// Turn into a model run carrying `text`
    pub fn into_run(self, text: impl Into<String>) -> Run {
        Run {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            font_name: self.font_name,
            font_size: self.font_size,
            color: self.color,
        }
    }
}

impl From<RunProperties> for ResolvedStyle {
    fn from(props: RunProperties) -> Self {
        Self {
            bold: props.bold.unwrap_or(false),
            italic: props.italic.unwrap_or(false),
            underline: props.underline.unwrap_or(false),
            font_name: props.font_name,
            font_size: props.font_size,
            color: props.color,
        }
    }
}

/// Resolve the effective formatting of a raw run
///
/// Layers apply in order: document defaults, paragraph style chain,
/// character style chain, direct formatting.
pub fn resolve_effective_style(
    raw_run: &RawRun,
    paragraph_style: Option<&str>,
    styles: &StyleSheet,
) -> ResolvedStyle {
    let mut props = styles.paragraph_run_properties(paragraph_style);

    let char_style = raw_run
        .properties
        .style_id
        .as_deref()
        .or(styles.default_character.as_deref());
    if let Some(id) = char_style {
        props.overlay(&styles.chain_run_properties(id));
    }

    props.overlay(&raw_run.properties);
    ResolvedStyle::from(props)
}

impl StyleSheet {
    /// Parse styles from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut parser = StyleParser::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => parser.open(e, false),
                Ok(Event::Empty(ref e)) => parser.open(e, true),
                Ok(Event::End(ref e)) => parser.close(e.local_name().as_ref()),
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractionError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(parser.sheet)
    }

    /// Get a style by ID
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Number of defined styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if no styles are defined
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Resolve the full inheritance chain for a style, most specific first
    pub fn resolve_chain(&self, style_id: &str) -> Vec<&Style> {
        let mut chain = Vec::new();
        let mut current = style_id;
        let mut seen = HashSet::new();

        while let Some(style) = self.get(current) {
            if !seen.insert(&style.id) {
                break; // basedOn cycle
            }
            chain.push(style);
            match style.based_on {
                Some(ref base) => current = base,
                None => break,
            }
        }

        chain
    }

    /// Paragraph style ID in force for an optional explicit reference
    pub fn paragraph_style_id<'a>(&'a self, style_id: Option<&'a str>) -> Option<&'a str> {
        style_id.or(self.default_paragraph.as_deref())
    }

    /// Display name of a paragraph style
    pub fn display_name(&self, style_id: Option<&str>) -> String {
        match self.paragraph_style_id(style_id) {
            Some(id) => self
                .get(id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| id.to_string()),
            None => DEFAULT_STYLE_NAME.to_string(),
        }
    }

    /// Display name of a table style
    pub fn table_style_name(&self, style_id: &str) -> String {
        self.get(style_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| style_id.to_string())
    }

    /// Run properties contributed by defaults and a paragraph style chain
    pub fn paragraph_run_properties(&self, style_id: Option<&str>) -> RunProperties {
        let mut props = self.run_defaults.clone();
        if let Some(id) = self.paragraph_style_id(style_id) {
            props.overlay(&self.chain_run_properties(id));
        }
        props
    }

    /// Paragraph properties contributed by defaults and a style chain
    pub fn paragraph_properties(&self, style_id: Option<&str>) -> ParagraphProperties {
        let mut props = self.paragraph_defaults.clone();
        if let Some(id) = self.paragraph_style_id(style_id) {
            for style in self.resolve_chain(id).into_iter().rev() {
                props.overlay(&style.paragraph);
            }
        }
        props
    }

    /// Run properties of a style chain alone, base style first
    fn chain_run_properties(&self, style_id: &str) -> RunProperties {
        let mut props = RunProperties::default();
        for style in self.resolve_chain(style_id).into_iter().rev() {
            props.overlay(&style.run);
        }
        props
    }

    /// Effective alignment of a paragraph with direct properties `direct`
    pub fn effective_alignment(&self, direct: &ParagraphProperties) -> Alignment {
        let mut props = self.paragraph_properties(direct.style_id.as_deref());
        props.overlay(direct);
        props.alignment.unwrap_or_default()
    }
}

#[derive(Default)]
struct StyleParser {
    sheet: StyleSheet,
    current: Option<StyleBuilder>,
    in_run_default: bool,
    in_paragraph_default: bool,
    in_rpr: bool,
    in_ppr: bool,
    /// Depth inside `w:tblStylePr` (conditional table formatting, ignored)
    conditional_depth: u32,
}

impl StyleParser {
    fn open(&mut self, e: &BytesStart, empty: bool) {
        let name = e.local_name();
        match name.as_ref() {
            b"tblStylePr" if !empty => self.conditional_depth += 1,
            _ if self.conditional_depth > 0 => {}
            b"rPrDefault" if !empty => self.in_run_default = true,
            b"pPrDefault" if !empty => self.in_paragraph_default = true,
            b"rPr" if !empty => self.in_rpr = true,
            b"pPr" if !empty => self.in_ppr = true,
            b"style" => {
                let builder = StyleBuilder {
                    id: get_attr(e, b"w:styleId"),
                    style_type: get_attr(e, b"w:type").map(|t| match t.as_str() {
                        "character" => StyleType::Character,
                        "table" => StyleType::Table,
                        "numbering" => StyleType::Numbering,
                        _ => StyleType::Paragraph,
                    }),
                    is_default: matches!(
                        get_attr(e, b"w:default").as_deref(),
                        Some("1") | Some("true")
                    ),
                    ..Default::default()
                };
                if empty {
                    self.finish_style(builder);
                } else {
                    self.current = Some(builder);
                }
            }
            b"name" => {
                if let Some(builder) = self.current.as_mut() {
                    builder.name = get_attr(e, b"w:val");
                }
            }
            b"basedOn" => {
                if let Some(builder) = self.current.as_mut() {
                    builder.based_on = get_attr(e, b"w:val");
                }
            }
            _ if self.in_rpr => {
                if let Some(builder) = self.current.as_mut() {
                    builder.run.apply(e);
                } else if self.in_run_default {
                    self.sheet.run_defaults.apply(e);
                }
            }
            _ if self.in_ppr => {
                if let Some(builder) = self.current.as_mut() {
                    builder.paragraph.apply(e);
                } else if self.in_paragraph_default {
                    self.sheet.paragraph_defaults.apply(e);
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"tblStylePr" => self.conditional_depth = self.conditional_depth.saturating_sub(1),
            _ if self.conditional_depth > 0 => {}
            b"rPrDefault" => self.in_run_default = false,
            b"pPrDefault" => self.in_paragraph_default = false,
            b"rPr" => self.in_rpr = false,
            b"pPr" => self.in_ppr = false,
            b"style" => {
                if let Some(builder) = self.current.take() {
                    self.finish_style(builder);
                }
            }
            _ => {}
        }
    }

    fn finish_style(&mut self, builder: StyleBuilder) {
        let is_default = builder.is_default;
        if let Some(style) = builder.build() {
            if is_default {
                match style.style_type {
                    StyleType::Paragraph => self.sheet.default_paragraph = Some(style.id.clone()),
                    StyleType::Character => self.sheet.default_character = Some(style.id.clone()),
                    _ => {}
                }
            }
            self.sheet.styles.insert(style.id.clone(), style);
        }
    }
}

#[derive(Default)]
struct StyleBuilder {
    id: Option<String>,
    name: Option<String>,
    style_type: Option<StyleType>,
    based_on: Option<String>,
    run: RunProperties,
    paragraph: ParagraphProperties,
    is_default: bool,
}

impl StyleBuilder {
    fn build(self) -> Option<Style> {
        let id = self.id?;
        Some(Style {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            style_type: self.style_type.unwrap_or(StyleType::Paragraph),
            based_on: self.based_on,
            run: self.run,
            paragraph: self.paragraph,
        })
    }
}
