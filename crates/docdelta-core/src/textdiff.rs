//! Token-level text and formatting diffs
//!
//! Paragraph text is split into whitespace-separated tokens and diffed with
//! Myers' algorithm. Run formatting is compared character by character over
//! the tokens both versions share.

use docdelta_model::{Paragraph, Run, SpanTag, StyleAttribute, StyleChange, TextSpan};
use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::config::CompareOptions;
use crate::normalize::{normalize_text, token_key, tokens};

/// Run attributes compared per character, in report order
pub const RUN_ATTRIBUTES: [StyleAttribute; 6] = [
    StyleAttribute::Bold,
    StyleAttribute::Italic,
    StyleAttribute::Underline,
    StyleAttribute::FontName,
    StyleAttribute::FontSize,
    StyleAttribute::Color,
];

/// Token diff of two texts; empty when they compare equal
pub fn text_spans(before: &str, after: &str, options: &CompareOptions) -> Vec<TextSpan> {
    if normalize_text(before, options) == normalize_text(after, options) {
        return Vec::new();
    }

    let old = tokens(before);
    let new = tokens(after);
    let old_keys: Vec<String> = old.iter().map(|t| token_key(t, options)).collect();
    let new_keys: Vec<String> = new.iter().map(|t| token_key(t, options)).collect();

    // Same tokens, different spacing
    if old_keys == new_keys {
        return vec![
            TextSpan::new(SpanTag::Deleted, before),
            TextSpan::new(SpanTag::Inserted, after),
        ];
    }

    let mut spans = SpanBuilder::default();
    for op in capture_diff_slices(Algorithm::Myers, &old_keys, &new_keys) {
        match op {
            DiffOp::Equal { new_index, len, .. } => {
                spans.push(SpanTag::Equal, &new[new_index..new_index + len]);
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                spans.push(SpanTag::Deleted, &old[old_index..old_index + old_len]);
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                spans.push(SpanTag::Inserted, &new[new_index..new_index + new_len]);
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                spans.push(SpanTag::Deleted, &old[old_index..old_index + old_len]);
                spans.push(SpanTag::Inserted, &new[new_index..new_index + new_len]);
            }
        }
    }
    spans.spans
}

#[derive(Default)]
struct SpanBuilder {
    spans: Vec<TextSpan>,
}

impl SpanBuilder {
    fn push(&mut self, tag: SpanTag, words: &[&str]) {
        if words.is_empty() {
            return;
        }
        let text = words.join(" ");
        match self.spans.last_mut() {
            Some(last) if last.tag == tag => {
                last.text.push(' ');
                last.text.push_str(&text);
            }
            _ => self.spans.push(TextSpan::new(tag, text)),
        }
    }
}

/// A token with the run that formats each of its characters
struct FormattedToken<'a> {
    text: String,
    runs: Vec<&'a Run>,
}

fn formatted_tokens(paragraph: &Paragraph) -> Vec<FormattedToken<'_>> {
    let mut out = Vec::new();
    let mut current = FormattedToken {
        text: String::new(),
        runs: Vec::new(),
    };

    for run in &paragraph.runs {
        for c in run.text.chars() {
            if c.is_whitespace() {
                if !current.text.is_empty() {
                    out.push(std::mem::replace(
                        &mut current,
                        FormattedToken {
                            text: String::new(),
                            runs: Vec::new(),
                        },
                    ));
                }
            } else {
                current.text.push(c);
                current.runs.push(run);
            }
        }
    }
    if !current.text.is_empty() {
        out.push(current);
    }
    out
}

/// Report value of a run attribute
pub fn run_attribute(run: &Run, attribute: StyleAttribute) -> String {
    match attribute {
        StyleAttribute::Bold => run.bold.to_string(),
        StyleAttribute::Italic => run.italic.to_string(),
        StyleAttribute::Underline => run.underline.to_string(),
        StyleAttribute::FontName => run
            .font_name
            .clone()
            .unwrap_or_else(|| "default".to_string()),
        StyleAttribute::FontSize => run
            .font_size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "default".to_string()),
        StyleAttribute::Color => run.color.clone().unwrap_or_else(|| "auto".to_string()),
        StyleAttribute::Style | StyleAttribute::Alignment | StyleAttribute::TableStyle => {
            String::new()
        }
    }
}

/// Run formatting differences over the text both paragraphs share
///
/// Consecutive tokens with the same attribute, old value and new value
/// merge into one entry.
pub fn run_style_changes(
    before: &Paragraph,
    after: &Paragraph,
    options: &CompareOptions,
) -> Vec<StyleChange> {
    let old = formatted_tokens(before);
    let new = formatted_tokens(after);
    let old_keys: Vec<String> = old.iter().map(|t| token_key(&t.text, options)).collect();
    let new_keys: Vec<String> = new.iter().map(|t| token_key(&t.text, options)).collect();

    let mut changes: Vec<StyleChange> = Vec::new();
    // Per attribute: (entry index, after token position) of the open entry
    let mut open = [None::<(usize, usize)>; RUN_ATTRIBUTES.len()];

    for op in capture_diff_slices(Algorithm::Myers, &old_keys, &new_keys) {
        let DiffOp::Equal {
            old_index,
            new_index,
            len,
        } = op
        else {
            continue;
        };

        for k in 0..len {
            let (o, n) = (&old[old_index + k], &new[new_index + k]);
            let position = new_index + k;

            for (slot, &attribute) in RUN_ATTRIBUTES.iter().enumerate() {
                let Some((was, now)) = first_difference(o, n, attribute) else {
                    continue;
                };

                match open[slot] {
                    Some((entry, last))
                        if last + 1 == position
                            && changes[entry].before == was
                            && changes[entry].after == now =>
                    {
                        if let Some(text) = changes[entry].text.as_mut() {
                            text.push(' ');
                            text.push_str(&n.text);
                        }
                        open[slot] = Some((entry, position));
                    }
                    _ => {
                        changes.push(StyleChange {
                            attribute,
                            before: was,
                            after: now,
                            text: Some(n.text.clone()),
                        });
                        open[slot] = Some((changes.len() - 1, position));
                    }
                }
            }
        }
    }
    changes
}

fn first_difference(
    old: &FormattedToken<'_>,
    new: &FormattedToken<'_>,
    attribute: StyleAttribute,
) -> Option<(String, String)> {
    old.runs.iter().zip(&new.runs).find_map(|(a, b)| {
        let was = run_attribute(a, attribute);
        let now = run_attribute(b, attribute);
        (was != now).then_some((was, now))
    })
}
