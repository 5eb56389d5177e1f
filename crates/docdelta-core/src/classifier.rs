//! Change classification
//!
//! Turns an alignment of two block sequences into a [`ChangeSet`]: each
//! matched pair becomes `Unchanged`, `Modified` or `Moved` with a detail
//! payload, each unmatched block becomes `Inserted` or `Deleted`. Tables are
//! classified recursively through their rows and cells.

use std::collections::BTreeSet;

use docdelta_model::{
    Block, BlockKind, CellChange, Change, ChangeDetail, ChangeKind, ChangeSet, EditCategory,
    Image, ImageDelta, MoveDetail, Paragraph, Row, RowChange, StyleAttribute, StyleChange, Table,
};

use crate::config::CompareOptions;
use crate::describe::Describer;
use crate::matcher::{align, Pair, Step};
use crate::normalize::normalize_text;
use crate::textdiff::{run_style_changes, text_spans};

/// Classifies aligned blocks under a set of options
pub struct Classifier<'a> {
    options: &'a CompareOptions,
    describer: Describer<'a>,
}

impl<'a> Classifier<'a> {
    pub fn new(options: &'a CompareOptions) -> Self {
        Self {
            options,
            describer: Describer::new(options),
        }
    }

    /// Align and classify two block sequences, in after-document order
    pub fn classify_blocks(&self, before: &[Block], after: &[Block]) -> ChangeSet {
        let matching = align(before, after, self.options);

        matching
            .steps()
            .into_iter()
            .map(|step| match step {
                Step::Matched(pair) => {
                    self.classify_pair(&before[pair.before], &after[pair.after], pair)
                }
                Step::Deleted(i) => {
                    let block = &before[i];
                    Change::deleted(block.variant(), i)
                        .with_description(self.describer.deleted(block))
                }
                Step::Inserted(j) => {
                    let block = &after[j];
                    Change::inserted(block.variant(), j)
                        .with_description(self.describer.inserted(block))
                }
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn classify_pair(&self, before: &Block, after: &Block, pair: Pair) -> Change {
        let mut detail = if before.fingerprint == after.fingerprint {
            ChangeDetail::default()
        } else {
            match (&before.kind, &after.kind) {
                (BlockKind::Paragraph(a), BlockKind::Paragraph(b)) => self.paragraph_detail(a, b),
                (BlockKind::Table(a), BlockKind::Table(b)) => self.table_detail(a, b),
                (BlockKind::Image(a), BlockKind::Image(b)) => image_detail(a, b),
                // The aligner never pairs different variants
                _ => ChangeDetail::default(),
            }
        };

        // Whitespace-only table edits leave a list of unchanged rows behind
        if detail.is_empty() {
            detail = ChangeDetail::default();
        }

        let kind = if pair.moved {
            detail.moved = Some(MoveDetail {
                from: pair.before,
                to: pair.after,
            });
            ChangeKind::Moved
        } else if detail.is_empty() {
            ChangeKind::Unchanged
        } else {
            ChangeKind::Modified
        };

        let description = if kind == ChangeKind::Unchanged {
            String::new()
        } else {
            self.describer.modified(kind, &detail)
        };

        Change::matched(kind, before.variant(), pair.before, pair.after)
            .with_similarity(pair.similarity)
            .with_detail(detail)
            .with_description(description)
    }

    /// Text spans, style changes and edit category of a paragraph pair
    pub fn paragraph_detail(&self, before: &Paragraph, after: &Paragraph) -> ChangeDetail {
        let before_text = before.text();
        let after_text = after.text();

        let mut style = Vec::new();
        if before.style != after.style {
            style.push(StyleChange {
                attribute: StyleAttribute::Style,
                before: before.style.clone(),
                after: after.style.clone(),
                text: None,
            });
        }
        if before.alignment != after.alignment {
            style.push(StyleChange {
                attribute: StyleAttribute::Alignment,
                before: before.alignment.name().to_string(),
                after: after.alignment.name().to_string(),
                text: None,
            });
        }
        style.extend(run_style_changes(before, after, self.options));

        let text = text_spans(&before_text, &after_text, self.options);
        let category = if text.is_empty() && style.is_empty() {
            None
        } else {
            Some(edit_category(&before_text, &after_text, self.options))
        };

        ChangeDetail {
            text,
            style,
            category,
            ..Default::default()
        }
    }

    /// Row, cell and style changes of a table pair
    pub fn table_detail(&self, before: &Table, after: &Table) -> ChangeDetail {
        let mut style = Vec::new();
        if before.style != after.style {
            style.push(StyleChange {
                attribute: StyleAttribute::TableStyle,
                before: before.style.clone().unwrap_or_else(|| "none".to_string()),
                after: after.style.clone().unwrap_or_else(|| "none".to_string()),
                text: None,
            });
        }

        let rows = align(&before.rows, &after.rows, self.options)
            .steps()
            .into_iter()
            .map(|step| match step {
                Step::Matched(pair) => {
                    self.row_change(&before.rows[pair.before], &after.rows[pair.after], pair)
                }
                Step::Deleted(i) => RowChange {
                    kind: ChangeKind::Deleted,
                    before: Some(i),
                    after: None,
                    similarity: None,
                    cells: Vec::new(),
                },
                Step::Inserted(j) => RowChange {
                    kind: ChangeKind::Inserted,
                    before: None,
                    after: Some(j),
                    similarity: None,
                    cells: Vec::new(),
                },
            })
            .collect();

        ChangeDetail {
            style,
            rows,
            ..Default::default()
        }
    }

    fn row_change(&self, before: &Row, after: &Row, pair: Pair) -> RowChange {
        let cells = if before.fingerprint == after.fingerprint {
            Vec::new()
        } else {
            self.cell_changes(before, after)
        };

        let kind = if pair.moved {
            ChangeKind::Moved
        } else if cells.is_empty() {
            ChangeKind::Unchanged
        } else {
            ChangeKind::Modified
        };

        RowChange {
            kind,
            before: Some(pair.before),
            after: Some(pair.after),
            similarity: Some(pair.similarity),
            cells,
        }
    }

    /// Positional cell comparison; only differing cells are returned
    fn cell_changes(&self, before: &Row, after: &Row) -> Vec<CellChange> {
        let width = before.cells.len().max(after.cells.len());
        let mut changes = Vec::new();

        for column in 0..width {
            match (before.cells.get(column), after.cells.get(column)) {
                (Some(a), Some(b)) => {
                    let nested = self.classify_blocks(&a.blocks, &b.blocks);
                    if nested.has_differences() {
                        changes.push(CellChange {
                            column,
                            kind: ChangeKind::Modified,
                            before_text: Some(a.text()),
                            after_text: Some(b.text()),
                            changes: nested,
                        });
                    }
                }
                (Some(a), None) => changes.push(CellChange {
                    column,
                    kind: ChangeKind::Deleted,
                    before_text: Some(a.text()),
                    after_text: None,
                    changes: ChangeSet::new(),
                }),
                (None, Some(b)) => changes.push(CellChange {
                    column,
                    kind: ChangeKind::Inserted,
                    before_text: None,
                    after_text: Some(b.text()),
                    changes: ChangeSet::new(),
                }),
                (None, None) => {}
            }
        }
        changes
    }
}

/// Old and new image properties, empty when nothing differs
fn image_detail(before: &Image, after: &Image) -> ChangeDetail {
    if before.content_hash == after.content_hash
        && before.width == after.width
        && before.height == after.height
        && before.alt_text == after.alt_text
    {
        return ChangeDetail::default();
    }

    ChangeDetail {
        image: Some(ImageDelta {
            before_hash: before.content_hash.clone(),
            after_hash: after.content_hash.clone(),
            before_size: before.size_label(),
            after_size: after.size_label(),
            before_alt: before.alt_text.clone(),
            after_alt: after.alt_text.clone(),
        }),
        ..Default::default()
    }
}

/// Coarse category of a paragraph edit from its word sets
pub fn edit_category(before: &str, after: &str, options: &CompareOptions) -> EditCategory {
    let before = normalize_text(before, options);
    let after = normalize_text(after, options);
    if before == after {
        return EditCategory::FormattingOnly;
    }

    let before = before.to_lowercase();
    let after = after.to_lowercase();
    let old: BTreeSet<&str> = before.split_whitespace().collect();
    let new: BTreeSet<&str> = after.split_whitespace().collect();

    if old == new {
        return EditCategory::WordOrder;
    }

    let added = new.difference(&old).count();
    let removed = old.difference(&new).count();
    match (added, removed) {
        (a, 0) if a > 0 => EditCategory::TextAdded,
        (0, r) if r > 0 => EditCategory::TextRemoved,
        (a, r) if a > r * 2 => EditCategory::SignificantAddition,
        (a, r) if r > a * 2 => EditCategory::SignificantRemoval,
        _ => EditCategory::ContentChanged,
    }
}
