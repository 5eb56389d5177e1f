//! Human-readable change descriptions

use docdelta_model::{
    Block, BlockKind, CellChange, ChangeDetail, ChangeKind, ImageDelta, RowChange, SpanTag,
    StyleAttribute, StyleChange, TextSpan,
};

use crate::config::CompareOptions;
use crate::normalize::truncate;

/// Builds bounded descriptions under a set of options
pub struct Describer<'a> {
    options: &'a CompareOptions,
}

impl<'a> Describer<'a> {
    pub fn new(options: &'a CompareOptions) -> Self {
        Self { options }
    }

    /// `'value'` truncated to the configured length, or `empty`
    pub fn quote(&self, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            "empty".to_string()
        } else {
            format!("'{}'", truncate(value, self.options.max_value_length))
        }
    }

    /// Join items, abbreviating past the display limit
    pub fn bounded(&self, items: Vec<String>) -> String {
        let limit = self.options.max_differences_display.max(1);
        let total = items.len();
        let mut shown: Vec<String> = items.into_iter().take(limit).collect();
        if total > limit {
            shown.push(format!("... and {} more", total - limit));
        }
        shown.join("; ")
    }

    /// A block present only in the after document
    pub fn inserted(&self, block: &Block) -> String {
        format!("Added {}", self.summary(block))
    }

    /// A block present only in the before document
    pub fn deleted(&self, block: &Block) -> String {
        format!("Removed {}", self.summary(block))
    }

    fn summary(&self, block: &Block) -> String {
        match &block.kind {
            BlockKind::Paragraph(p) => format!("paragraph: {}", self.quote(&p.text())),
            BlockKind::Table(t) => {
                let mut s = format!("table ({}x{})", t.row_count(), t.column_count());
                if let Some(caption) = &t.caption {
                    s.push_str(&format!(": {}", self.quote(caption)));
                }
                s
            }
            BlockKind::Image(img) => {
                let mut s = format!("image {}", img.size_label());
                if let Some(alt) = &img.alt_text {
                    s.push_str(&format!(": {}", self.quote(alt)));
                }
                s
            }
        }
    }

    /// Description of a matched pair's differences
    pub fn modified(&self, kind: ChangeKind, detail: &ChangeDetail) -> String {
        let mut items = Vec::new();
        if let (ChangeKind::Moved, Some(moved)) = (kind, detail.moved) {
            items.push(format!(
                "Moved from position {} to {}",
                moved.from + 1,
                moved.to + 1
            ));
        }

        if !detail.rows.is_empty() || has_table_style(detail) {
            items.extend(self.table_items(detail));
        } else if let Some(image) = &detail.image {
            items.push(self.image_item(image));
        } else if detail.text.is_empty() && !detail.style.is_empty() {
            items.push(format!(
                "Formatting only: {}",
                self.style_items(&detail.style).join(", ")
            ));
        } else {
            items.extend(self.text_items(&detail.text));
            if !detail.style.is_empty() {
                items.push(format!(
                    "formatting: {}",
                    self.style_items(&detail.style).join(", ")
                ));
            }
        }
        self.bounded(items)
    }

    fn style_items(&self, style: &[StyleChange]) -> Vec<String> {
        style
            .iter()
            .map(|s| {
                format!(
                    "{} {} → {}",
                    s.attribute,
                    truncate(&s.before, self.options.max_value_length),
                    truncate(&s.after, self.options.max_value_length)
                )
            })
            .collect()
    }

    /// `'old' changed to 'new'`, `Added: 'x'` and `Removed: 'x'` items
    pub fn text_items(&self, spans: &[TextSpan]) -> Vec<String> {
        let mut items = Vec::new();
        let mut iter = spans.iter().peekable();
        while let Some(span) = iter.next() {
            match span.tag {
                SpanTag::Equal => {}
                SpanTag::Deleted => match iter.peek() {
                    Some(next) if next.tag == SpanTag::Inserted => {
                        items.push(format!(
                            "{} changed to {}",
                            self.quote(&span.text),
                            self.quote(&next.text)
                        ));
                        iter.next();
                    }
                    _ => items.push(format!("Removed: {}", self.quote(&span.text))),
                },
                SpanTag::Inserted => items.push(format!("Added: {}", self.quote(&span.text))),
            }
        }
        items
    }

    fn image_item(&self, image: &ImageDelta) -> String {
        if image.before_hash != image.after_hash {
            return format!(
                "Image replaced ({} → {})",
                image.before_size, image.after_size
            );
        }
        let mut parts = Vec::new();
        if image.before_size != image.after_size {
            parts.push(format!("size {} → {}", image.before_size, image.after_size));
        }
        if image.before_alt != image.after_alt {
            parts.push(format!(
                "alt text {} → {}",
                self.quote(image.before_alt.as_deref().unwrap_or_default()),
                self.quote(image.after_alt.as_deref().unwrap_or_default())
            ));
        }
        format!("Image changed: {}", parts.join(", "))
    }

    fn table_items(&self, detail: &ChangeDetail) -> Vec<String> {
        let mut items: Vec<String> = detail
            .style
            .iter()
            .map(|s| format!("Table style {} → {}", self.quote(&s.before), self.quote(&s.after)))
            .collect();

        for row in &detail.rows {
            match row.kind {
                ChangeKind::Unchanged => {}
                ChangeKind::Inserted => items.push(format!(
                    "Row {} added",
                    row.after.map_or(0, |j| j + 1)
                )),
                ChangeKind::Deleted => items.push(format!(
                    "Row {} removed",
                    row.before.map_or(0, |i| i + 1)
                )),
                ChangeKind::Moved => {
                    items.push(format!(
                        "Row {} moved to {}",
                        row.before.map_or(0, |i| i + 1),
                        row.after.map_or(0, |j| j + 1)
                    ));
                    items.extend(self.cell_items(row));
                }
                ChangeKind::Modified => items.extend(self.cell_items(row)),
            }
        }
        items
    }

    fn cell_items(&self, row: &RowChange) -> Vec<String> {
        let number = row.after.or(row.before).map_or(0, |r| r + 1);
        row.cells
            .iter()
            .map(|cell| format!("Row {}, column {}: {}", number, cell.column + 1, self.cell_item(cell)))
            .collect()
    }

    fn cell_item(&self, cell: &CellChange) -> String {
        let before = cell.before_text.as_deref().unwrap_or_default();
        let after = cell.after_text.as_deref().unwrap_or_default();
        match cell.kind {
            ChangeKind::Inserted => format!("added {}", self.quote(after)),
            ChangeKind::Deleted => format!("removed {}", self.quote(before)),
            _ if before.trim() == after.trim() => "formatting changed".to_string(),
            _ => format!("{} changed to {}", self.quote(before), self.quote(after)),
        }
    }
}

fn has_table_style(detail: &ChangeDetail) -> bool {
    detail
        .style
        .iter()
        .any(|s| s.attribute == StyleAttribute::TableStyle)
}
