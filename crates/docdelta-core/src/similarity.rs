//! Similarity scoring
//!
//! All scores lie in `[0, 1]`. Paragraph scores blend text and formatting
//! similarity with the configured weights; table scores blend shape
//! agreement with cell content; images only ever score 1 (same content) or 0.
//!
//! Text ratios are `2 * M / T`, where `M` counts the characters of a longest
//! common subsequence and `T` is the combined length. [`TextProfile`] caches
//! what the aligner needs to bound that ratio without running the diff.

use std::collections::BTreeMap;

use docdelta_model::{Block, BlockKind, Fingerprint, Image, Paragraph, Row, Run, Table};
use similar::{capture_diff_slices, get_diff_ratio, Algorithm, DiffOp, TextDiff};

use crate::config::CompareOptions;
use crate::normalize::normalize_text;

/// Normalized text with its character count and character histogram
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextProfile {
    text: String,
    len: usize,
    /// Sorted by character
    histogram: Vec<(char, u32)>,
}

impl TextProfile {
    pub fn new(text: &str, options: &CompareOptions) -> Self {
        let text = normalize_text(text, options);
        let mut counts: BTreeMap<char, u32> = BTreeMap::new();
        for c in text.chars() {
            *counts.entry(c).or_default() += 1;
        }
        Self {
            len: text.chars().count(),
            histogram: counts.into_iter().collect(),
            text,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Upper bound of [`TextProfile::ratio`] from lengths alone
    pub fn length_bound(&self, other: &TextProfile) -> f64 {
        ratio_of(self.len.min(other.len), self.len + other.len)
    }

    /// Upper bound of [`TextProfile::ratio`] from shared characters, ignoring order
    pub fn overlap_bound(&self, other: &TextProfile) -> f64 {
        let (mut a, mut b) = (self.histogram.iter().peekable(), other.histogram.iter().peekable());
        let mut shared = 0usize;
        while let (Some(&&(ca, na)), Some(&&(cb, nb))) = (a.peek(), b.peek()) {
            match ca.cmp(&cb) {
                std::cmp::Ordering::Less => {
                    a.next();
                }
                std::cmp::Ordering::Greater => {
                    b.next();
                }
                std::cmp::Ordering::Equal => {
                    shared += na.min(nb) as usize;
                    a.next();
                    b.next();
                }
            }
        }
        ratio_of(shared, self.len + other.len)
    }

    /// Character-level similarity ratio
    pub fn ratio(&self, other: &TextProfile) -> f64 {
        char_ratio(&self.text, self.len, &other.text, other.len)
    }
}

fn ratio_of(matched: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matched as f64 / total as f64
    }
}

fn char_ratio(a: &str, a_len: usize, b: &str, b_len: usize) -> f64 {
    if a == b {
        return 1.0;
    }
    if a_len == 0 || b_len == 0 {
        return 0.0;
    }
    let matched: usize = TextDiff::from_chars(a, b)
        .ops()
        .iter()
        .map(|op| match *op {
            DiffOp::Equal { len, .. } => len,
            _ => 0,
        })
        .sum();
    ratio_of(matched, a_len + b_len)
}

/// Computes similarity scores under a set of options
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    options: &'a CompareOptions,
}

impl<'a> Scorer<'a> {
    pub fn new(options: &'a CompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &'a CompareOptions {
        self.options
    }

    pub fn profile(&self, text: &str) -> TextProfile {
        TextProfile::new(text, self.options)
    }

    /// Character-level similarity ratio of two texts
    pub fn text(&self, a: &str, b: &str) -> f64 {
        let a = normalize_text(a, self.options);
        let b = normalize_text(b, self.options);
        char_ratio(&a, a.chars().count(), &b, b.chars().count())
    }

    /// Fraction of paragraph-level and leading-run attributes that agree
    pub fn style(&self, a: &Paragraph, b: &Paragraph) -> f64 {
        let plain = Run::default();
        let ra = leading_run(a).unwrap_or(&plain);
        let rb = leading_run(b).unwrap_or(&plain);
        let checks = [
            a.style == b.style,
            a.alignment == b.alignment,
            ra.bold == rb.bold,
            ra.italic == rb.italic,
            ra.underline == rb.underline,
            ra.font_name == rb.font_name,
            ra.font_size == rb.font_size,
            ra.color == rb.color,
        ];
        checks.iter().filter(|&&c| c).count() as f64 / checks.len() as f64
    }

    /// Weighted text and style similarity of two paragraphs
    pub fn paragraph(&self, a: &Paragraph, b: &Paragraph) -> f64 {
        let text = self.text(&a.text(), &b.text());
        self.weighted(text, self.style(a, b))
    }

    /// [`Scorer::paragraph`] over precomputed text profiles
    pub fn paragraph_profiled(
        &self,
        a: &Paragraph,
        pa: &TextProfile,
        b: &Paragraph,
        pb: &TextProfile,
    ) -> f64 {
        self.weighted(pa.ratio(pb), self.style(a, b))
    }

    /// Upper bound of [`Scorer::paragraph`]
    ///
    /// Stops at the length bound when that already fails the threshold.
    pub fn paragraph_bound(&self, pa: &TextProfile, pb: &TextProfile) -> f64 {
        let bound = self.weighted(pa.length_bound(pb), 1.0);
        if bound <= self.options.similarity_threshold {
            return bound;
        }
        self.weighted(pa.overlap_bound(pb), 1.0)
    }

    fn weighted(&self, text: f64, style: f64) -> f64 {
        let tw = self.options.text_weight;
        let sw = self.options.style_weight;
        (tw * text + sw * style) / (tw + sw)
    }

    /// Shape agreement blended with cell content similarity
    pub fn table(&self, a: &Table, b: &Table) -> f64 {
        let shape = (count_ratio(a.row_count(), b.row_count())
            + count_ratio(a.column_count(), b.column_count()))
            / 2.0;

        let cells_a = self.cell_texts(a);
        let cells_b = self.cell_texts(b);
        let cells = if cells_a.is_empty() && cells_b.is_empty() {
            1.0
        } else {
            let ops = capture_diff_slices(Algorithm::Myers, &cells_a, &cells_b);
            f64::from(get_diff_ratio(&ops, cells_a.len(), cells_b.len()))
        };

        let w = self.options.table_shape_weight;
        w * shape + (1.0 - w) * cells
    }

    fn cell_texts(&self, table: &Table) -> Vec<String> {
        table
            .rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .map(|c| normalize_text(&c.text(), self.options))
            .collect()
    }

    /// Images match only on identical content
    pub fn image(&self, a: &Image, b: &Image) -> f64 {
        if a.content_hash == b.content_hash {
            1.0
        } else {
            0.0
        }
    }

    /// Cell text profiles of a row, in column order
    pub fn row_profile(&self, row: &Row) -> Vec<TextProfile> {
        row.cells.iter().map(|c| self.profile(&c.text())).collect()
    }

    /// Mean positional cell text similarity over the wider row
    pub fn row(&self, a: &Row, b: &Row) -> f64 {
        self.row_profiled(&self.row_profile(a), &self.row_profile(b))
    }

    pub fn row_profiled(&self, a: &[TextProfile], b: &[TextProfile]) -> f64 {
        mean_over_wider(a, b, TextProfile::ratio)
    }

    /// Upper bound of [`Scorer::row`]
    pub fn row_bound(&self, a: &[TextProfile], b: &[TextProfile]) -> f64 {
        mean_over_wider(a, b, TextProfile::overlap_bound)
    }
}

fn mean_over_wider(
    a: &[TextProfile],
    b: &[TextProfile],
    score: impl Fn(&TextProfile, &TextProfile) -> f64,
) -> f64 {
    let width = a.len().max(b.len());
    if width == 0 {
        return 1.0;
    }
    let total: f64 = a.iter().zip(b).map(|(x, y)| score(x, y)).sum();
    total / width as f64
}

fn count_ratio(a: usize, b: usize) -> f64 {
    if a == b {
        1.0
    } else {
        a.min(b) as f64 / a.max(b) as f64
    }
}

fn leading_run(p: &Paragraph) -> Option<&Run> {
    p.runs.iter().find(|r| !r.text.trim().is_empty())
}

/// An element the aligner can pair across two sequences
pub trait Comparable {
    /// Derived once per element and reused for every candidate pairing
    type Profile;

    fn fingerprint(&self) -> &Fingerprint;

    /// Whether the two elements may be paired at all
    fn compatible(&self, other: &Self) -> bool;

    fn profile(&self, scorer: &Scorer<'_>) -> Self::Profile;

    fn similarity(
        &self,
        own: &Self::Profile,
        other: &Self,
        theirs: &Self::Profile,
        scorer: &Scorer<'_>,
    ) -> f64;

    /// Cheap upper bound of [`Comparable::similarity`]
    fn similarity_bound(
        &self,
        _own: &Self::Profile,
        _other: &Self,
        _theirs: &Self::Profile,
        _scorer: &Scorer<'_>,
    ) -> f64 {
        1.0
    }

    /// Whether unmatched elements between the same anchors pair up as replacements
    fn replaceable(&self) -> bool {
        false
    }
}

impl Comparable for Block {
    /// Paragraph text; empty for tables and images
    type Profile = TextProfile;

    fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    fn compatible(&self, other: &Self) -> bool {
        self.variant() == other.variant()
    }

    fn profile(&self, scorer: &Scorer<'_>) -> TextProfile {
        match &self.kind {
            BlockKind::Paragraph(p) => scorer.profile(&p.text()),
            _ => TextProfile::default(),
        }
    }

    fn similarity(
        &self,
        own: &TextProfile,
        other: &Self,
        theirs: &TextProfile,
        scorer: &Scorer<'_>,
    ) -> f64 {
        match (&self.kind, &other.kind) {
            (BlockKind::Paragraph(a), BlockKind::Paragraph(b)) => {
                scorer.paragraph_profiled(a, own, b, theirs)
            }
            (BlockKind::Table(a), BlockKind::Table(b)) => scorer.table(a, b),
            (BlockKind::Image(a), BlockKind::Image(b)) => scorer.image(a, b),
            _ => 0.0,
        }
    }

    fn similarity_bound(
        &self,
        own: &TextProfile,
        other: &Self,
        theirs: &TextProfile,
        scorer: &Scorer<'_>,
    ) -> f64 {
        match (&self.kind, &other.kind) {
            (BlockKind::Paragraph(_), BlockKind::Paragraph(_)) => {
                scorer.paragraph_bound(own, theirs)
            }
            (BlockKind::Image(a), BlockKind::Image(b)) => scorer.image(a, b),
            _ => 1.0,
        }
    }

    fn replaceable(&self) -> bool {
        matches!(self.kind, BlockKind::Image(_))
    }
}

impl Comparable for Row {
    /// Cell texts
    type Profile = Vec<TextProfile>;

    fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    fn compatible(&self, _other: &Self) -> bool {
        true
    }

    fn profile(&self, scorer: &Scorer<'_>) -> Vec<TextProfile> {
        scorer.row_profile(self)
    }

    fn similarity(
        &self,
        own: &Vec<TextProfile>,
        _other: &Self,
        theirs: &Vec<TextProfile>,
        scorer: &Scorer<'_>,
    ) -> f64 {
        scorer.row_profiled(own, theirs)
    }

    fn similarity_bound(
        &self,
        own: &Vec<TextProfile>,
        _other: &Self,
        theirs: &Vec<TextProfile>,
        scorer: &Scorer<'_>,
    ) -> f64 {
        scorer.row_bound(own, theirs)
    }
}
