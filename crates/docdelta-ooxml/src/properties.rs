//! Run and paragraph property sets
//!
//! The same `w:rPr` / `w:pPr` children appear in document defaults, style
//! definitions and direct formatting. Every field is optional so that
//! layers can be overlaid in inheritance order.

use docdelta_model::Alignment;
use quick_xml::events::BytesStart;

/// Character formatting as written in one layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProperties {
    /// Character style reference (`w:rStyle`), direct formatting only
    pub style_id: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub font_name: Option<String>,
    /// Size in points
    pub font_size: Option<f32>,
    /// Color as upper-case RRGGBB
    pub color: Option<String>,
}

impl RunProperties {
    /// Overlay `other` on top of `self`; set fields in `other` win
    pub fn overlay(&mut self, other: &RunProperties) {
        if other.style_id.is_some() {
            self.style_id.clone_from(&other.style_id);
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.font_name.is_some() {
            self.font_name.clone_from(&other.font_name);
        }
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.color.is_some() {
            self.color.clone_from(&other.color);
        }
    }

    /// Apply one `w:rPr` child element; returns false for unknown elements
    pub(crate) fn apply(&mut self, e: &BytesStart) -> bool {
        match e.local_name().as_ref() {
            b"rStyle" => self.style_id = get_attr(e, b"w:val"),
            b"b" => self.bold = Some(toggle_value(e)),
            b"i" => self.italic = Some(toggle_value(e)),
            b"u" => {
                self.underline = Some(
                    get_attr(e, b"w:val")
                        .map(|v| v != "none" && v != "0" && v != "false")
                        .unwrap_or(true),
                )
            }
            b"rFonts" => {
                if let Some(font) = get_attr(e, b"w:ascii").or_else(|| get_attr(e, b"w:hAnsi")) {
                    self.font_name = Some(font);
                }
            }
            b"sz" => {
                if let Some(half_points) = get_attr(e, b"w:val").and_then(|v| v.parse::<f32>().ok())
                {
                    self.font_size = Some(half_points / 2.0);
                }
            }
            b"color" => {
                if let Some(color) = get_attr(e, b"w:val") {
                    if !color.eq_ignore_ascii_case("auto") {
                        self.color = Some(color.to_ascii_uppercase());
                    }
                }
            }
            _ => return false,
        }
        true
    }
}

/// Paragraph formatting as written in one layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProperties {
    /// Paragraph style reference (`w:pStyle`), direct formatting only
    pub style_id: Option<String>,
    pub alignment: Option<Alignment>,
    /// Outline level, 0-based (0 = top-level heading, 9 = body text)
    pub outline_level: Option<u8>,
}

impl ParagraphProperties {
    /// Overlay `other` on top of `self`; set fields in `other` win
    pub fn overlay(&mut self, other: &ParagraphProperties) {
        if other.style_id.is_some() {
            self.style_id.clone_from(&other.style_id);
        }
        if other.alignment.is_some() {
            self.alignment = other.alignment;
        }
        if other.outline_level.is_some() {
            self.outline_level = other.outline_level;
        }
    }

    /// Apply one `w:pPr` child element; returns false for unknown elements
    pub(crate) fn apply(&mut self, e: &BytesStart) -> bool {
        match e.local_name().as_ref() {
            b"pStyle" => self.style_id = get_attr(e, b"w:val"),
            b"jc" => self.alignment = get_attr(e, b"w:val").map(|v| Alignment::from_ooxml(&v)),
            b"outlineLvl" => {
                self.outline_level = get_attr(e, b"w:val").and_then(|v| v.parse().ok())
            }
            _ => return false,
        }
        true
    }
}

/// `<w:b/>` is on; `w:val` of `0`, `false` or `off` turns the toggle off
fn toggle_value(e: &BytesStart) -> bool {
    get_attr(e, b"w:val")
        .map(|v| !matches!(v.as_str(), "0" | "false" | "off"))
        .unwrap_or(true)
}

pub(crate) fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Get attribute by local name, ignoring the namespace prefix
pub(crate) fn get_attr_local(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn element(xml: &str) -> BytesStart<'static> {
        let mut reader = Reader::from_str(xml);
        match reader.read_event().unwrap() {
            Event::Empty(e) | Event::Start(e) => e.into_owned(),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_toggle_values() {
        let mut props = RunProperties::default();
        props.apply(&element(r#"<w:b/>"#));
        assert_eq!(props.bold, Some(true));
        props.apply(&element(r#"<w:b w:val="0"/>"#));
        assert_eq!(props.bold, Some(false));
        props.apply(&element(r#"<w:i w:val="off"/>"#));
        assert_eq!(props.italic, Some(false));
    }

    #[test]
    fn test_underline_none() {
        let mut props = RunProperties::default();
        props.apply(&element(r#"<w:u w:val="single"/>"#));
        assert_eq!(props.underline, Some(true));
        props.apply(&element(r#"<w:u w:val="none"/>"#));
        assert_eq!(props.underline, Some(false));
    }

    #[test]
    fn test_size_is_half_points() {
        let mut props = RunProperties::default();
        props.apply(&element(r#"<w:sz w:val="28"/>"#));
        assert_eq!(props.font_size, Some(14.0));
    }

    #[test]
    fn test_color_auto_is_ignored() {
        let mut props = RunProperties::default();
        props.apply(&element(r#"<w:color w:val="auto"/>"#));
        assert_eq!(props.color, None);
        props.apply(&element(r#"<w:color w:val="ff0000"/>"#));
        assert_eq!(props.color.as_deref(), Some("FF0000"));
    }

    #[test]
    fn test_fonts_fall_back_to_hansi() {
        let mut props = RunProperties::default();
        props.apply(&element(r#"<w:rFonts w:hAnsi="Arial"/>"#));
        assert_eq!(props.font_name.as_deref(), Some("Arial"));
    }

    #[test]
    fn test_unknown_element_not_applied() {
        let mut props = RunProperties::default();
        assert!(!props.apply(&element(r#"<w:lang w:val="en-US"/>"#)));
        assert_eq!(props, RunProperties::default());
    }

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let mut base = RunProperties {
            bold: Some(true),
            font_name: Some("Calibri".to_string()),
            ..Default::default()
        };
        let top = RunProperties {
            bold: Some(false),
            ..Default::default()
        };
        base.overlay(&top);
        assert_eq!(base.bold, Some(false));
        assert_eq!(base.font_name.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_paragraph_properties() {
        let mut props = ParagraphProperties::default();
        props.apply(&element(r#"<w:jc w:val="both"/>"#));
        props.apply(&element(r#"<w:outlineLvl w:val="1"/>"#));
        props.apply(&element(r#"<w:pStyle w:val="Heading2"/>"#));
        assert_eq!(props.alignment, Some(Alignment::Justify));
        assert_eq!(props.outline_level, Some(1));
        assert_eq!(props.style_id.as_deref(), Some("Heading2"));
    }
}
