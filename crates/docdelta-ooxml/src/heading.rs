//! Heading detection
//!
//! Custom corporate templates rarely use the built-in heading styles, so a
//! paragraph counts as a heading when any of these hold, checked in order:
//! its resolved outline level, its style name, its formatting (short bold
//! text with a large font) or a leading section number on bold text.

use std::sync::OnceLock;

use docdelta_model::Run;
use regex::Regex;

/// Deepest heading level Word supports
pub const MAX_HEADING_LEVEL: u8 = 9;

/// Bold paragraphs longer than this are body text
const MAX_HEADING_CHARS: usize = 150;

/// Determine the heading level (1-9) of a paragraph
///
/// `outline_level` is the resolved, 0-based `w:outlineLvl`; level 9 means
/// body text.
pub fn detect_heading_level(
    style_name: &str,
    outline_level: Option<u8>,
    runs: &[Run],
) -> Option<u8> {
    if let Some(level) = outline_level {
        if level < MAX_HEADING_LEVEL {
            return Some(level + 1);
        }
    }

    if let Some(level) = level_from_style_name(style_name) {
        return Some(level);
    }

    level_from_formatting(runs)
}

/// Heading level implied by a style display name
pub fn level_from_style_name(name: &str) -> Option<u8> {
    static NUMBERED_RE: OnceLock<Regex> = OnceLock::new();
    let re = NUMBERED_RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:heading|заголовок|h)[\s_]*(\d+)$").expect("valid heading pattern")
    });

    let trimmed = name.trim();
    if let Some(caps) = re.captures(trimmed) {
        return caps[1]
            .parse::<u8>()
            .ok()
            .filter(|l| (1..=MAX_HEADING_LEVEL).contains(l));
    }

    match trimmed.to_lowercase().as_str() {
        "title" | "название" => Some(1),
        "subtitle" | "подзаголовок" => Some(2),
        _ => None,
    }
}

/// Heading level guessed from direct appearance
fn level_from_formatting(runs: &[Run]) -> Option<u8> {
    let first = runs.iter().find(|r| !r.text.trim().is_empty())?;
    let text: String = runs.iter().map(|r| r.text.as_str()).collect();
    let text = text.trim();

    if !first.bold || text.chars().count() >= MAX_HEADING_CHARS {
        return None;
    }

    match first.font_size {
        Some(size) if size >= 18.0 => return Some(1),
        Some(size) if size >= 16.0 => return Some(2),
        Some(size) if size >= 14.0 => return Some(3),
        _ => {}
    }

    let all_bold = runs
        .iter()
        .filter(|r| !r.text.trim().is_empty())
        .all(|r| r.bold);
    if all_bold {
        return section_number_depth(text);
    }

    None
}

/// Depth of a leading section number such as `1.2. `
pub fn section_number_depth(text: &str) -> Option<u8> {
    static SECTION_RE: OnceLock<Regex> = OnceLock::new();
    let re = SECTION_RE
        .get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)*)\.?\s+\S").expect("valid section pattern"));

    let caps = re.captures(text)?;
    let depth = caps[1].split('.').count();
    u8::try_from(depth)
        .ok()
        .filter(|d| (1..=MAX_HEADING_LEVEL).contains(d))
}
