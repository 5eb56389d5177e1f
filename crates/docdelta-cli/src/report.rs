//! Comparison reports
//!
//! Renders a [`ChangeSet`] either as a human-readable text report or as a
//! JSON document carrying the statistics and every change entry.

use std::fmt::Write as _;

use docdelta_core::CompareMode;
use docdelta_model::{Change, ChangeKind, ChangeSet, ChangeStatistics, DocumentModel};
use serde::Serialize;

/// A finished comparison together with the models it was computed from
pub struct ComparisonReport<'a> {
    pub before_name: &'a str,
    pub after_name: &'a str,
    pub mode: CompareMode,
    pub before: &'a DocumentModel,
    pub after: &'a DocumentModel,
    pub changes: &'a ChangeSet,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    before: &'a str,
    after: &'a str,
    mode: CompareMode,
    statistics: ChangeStatistics,
    changes: &'a ChangeSet,
}

impl<'a> ComparisonReport<'a> {
    /// Text report; `show_all` includes unchanged blocks
    pub fn to_text(&self, show_all: bool) -> String {
        let stats = self.changes.statistics();
        let mut out = String::new();

        let _ = writeln!(out, "Comparing: {} -> {}", self.before_name, self.after_name);
        let _ = writeln!(out, "Mode: {}", self.mode);
        out.push('\n');

        out.push_str("=== Summary ===\n");
        let _ = writeln!(
            out,
            "Blocks: {} before, {} after",
            self.before.len(),
            self.after.len()
        );
        for kind in [
            ChangeKind::Inserted,
            ChangeKind::Deleted,
            ChangeKind::Modified,
            ChangeKind::Moved,
            ChangeKind::Unchanged,
        ] {
            let _ = writeln!(
                out,
                "{:<10} {:>5} ({:.1}%)",
                format!("{}:", capitalize(kind.name())),
                stats.counts.get(kind),
                stats.percent(kind)
            );
        }
        out.push('\n');

        if !self.changes.has_differences() {
            out.push_str("✓ No differences found\n");
            if !show_all {
                return out;
            }
        }

        out.push_str("=== Changes ===\n");
        for change in self.changes.iter() {
            if show_all || change.kind.is_visible() {
                out.push_str(&self.change_line(change));
                out.push('\n');
            }
        }
        out
    }

    /// One line per change: kind, variant, positions, section, description
    pub fn change_line(&self, change: &Change) -> String {
        let position = match (change.before, change.after) {
            (Some(b), Some(a)) if b == a => format!("#{}", a + 1),
            (Some(b), Some(a)) => format!("#{} -> #{}", b + 1, a + 1),
            (Some(b), None) => format!("#{}", b + 1),
            (None, Some(a)) => format!("#{}", a + 1),
            (None, None) => String::new(),
        };

        let mut line = format!("[{}] {} {}", change.kind, change.variant, position);
        let section = self.section(change);
        if !section.is_empty() {
            let _ = write!(line, " ({})", section);
        }
        if !change.description.is_empty() {
            let _ = write!(line, ": {}", change.description);
        }
        line
    }

    /// Section path from the after document, or the before document for deletions
    fn section(&self, change: &Change) -> String {
        match (change.after, change.before) {
            (Some(a), _) => self.after.section_path(a),
            (None, Some(b)) => self.before.section_path(b),
            (None, None) => String::new(),
        }
    }

    /// Pretty-printed JSON report
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&JsonReport {
            before: self.before_name,
            after: self.after_name,
            mode: self.mode,
            statistics: self.changes.statistics(),
            changes: self.changes,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdelta_core::compare;
    use docdelta_model::{BlockKind, Paragraph};

    fn models() -> (DocumentModel, DocumentModel) {
        let before = DocumentModel::from_kinds(vec![
            BlockKind::Paragraph(Paragraph::plain("Costs").with_heading_level(1)),
            BlockKind::Paragraph(Paragraph::plain("The server costs 1000 dollars")),
            BlockKind::Paragraph(Paragraph::plain("Obsolete remark about printers")),
        ]);
        let after = DocumentModel::from_kinds(vec![
            BlockKind::Paragraph(Paragraph::plain("Costs").with_heading_level(1)),
            BlockKind::Paragraph(Paragraph::plain("The server costs 1500 dollars")),
        ]);
        (before, after)
    }

    fn report<'a>(
        before: &'a DocumentModel,
        after: &'a DocumentModel,
        changes: &'a ChangeSet,
    ) -> ComparisonReport<'a> {
        ComparisonReport {
            before_name: "v1.docx",
            after_name: "v2.docx",
            mode: CompareMode::Positional,
            before,
            after,
            changes,
        }
    }

    #[test]
    fn test_text_report() {
        let (before, after) = models();
        let changes = compare(&before, &after, CompareMode::Positional).unwrap();
        let text = report(&before, &after, &changes).to_text(false);

        assert!(text.contains("Comparing: v1.docx -> v2.docx"));
        assert!(text.contains("Blocks: 3 before, 2 after"));
        assert!(text.contains(
            "[modified] paragraph #2 (Costs): '1000' changed to '1500'"
        ));
        assert!(text.contains(
            "[deleted] paragraph #3 (Costs): Removed paragraph: 'Obsolete remark about printers'"
        ));
        assert!(!text.contains("[unchanged]"));
    }

    #[test]
    fn test_show_all_includes_unchanged() {
        let (before, after) = models();
        let changes = compare(&before, &after, CompareMode::Positional).unwrap();
        let text = report(&before, &after, &changes).to_text(true);
        assert!(text.contains("[unchanged] paragraph #1 (Costs)"));
    }

    #[test]
    fn test_no_differences() {
        let (before, _) = models();
        let changes = compare(&before, &before, CompareMode::Positional).unwrap();
        let text = report(&before, &before, &changes).to_text(false);
        assert!(text.contains("No differences found"));
        assert!(!text.contains("=== Changes ==="));
    }

    #[test]
    fn test_json_report() {
        let (before, after) = models();
        let changes = compare(&before, &after, CompareMode::Positional).unwrap();
        let json = report(&before, &after, &changes).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["mode"], "positional");
        assert_eq!(value["changes"].as_array().unwrap().len(), 3);
        assert_eq!(value["statistics"]["counts"]["deleted"], 1);
    }
}
