//! Element alignment
//!
//! Pairs elements of a "before" sequence with elements of an "after"
//! sequence. The same aligner serves document blocks and table rows.
//!
//! Positional mode runs four passes:
//!
//! 1. **Exact**: longest common subsequence over fingerprints, then a stable
//!    in-order pairing of leftover identical fingerprints.
//! 2. **Similarity**: remaining compatible pairs scoring above the threshold
//!    are assigned greedily, best score first, ties going to the smallest
//!    positional distance. Candidates within the same gap between anchored
//!    matches are assigned first, then the rest of the document.
//! 3. **Replacements**: leftover replaceable elements (images) that sit in the
//!    same gap between anchored matches are paired in order.
//! 4. **Moves**: pairs outside the longest order-preserving chain are moved,
//!    as are chain pairs that cross a moved pair at least as often. A pair
//!    with as many matches ahead of it in both documents stays in place.
//!
//! Content-based mode runs only the similarity pass, over all elements, and
//! never reports moves.
//!
//! The greedy assignment is evaluated lazily: candidates are queued by a
//! cheap upper bound and only scored in full when they reach the front.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use docdelta_model::Fingerprint;
use similar::{capture_diff_slices, Algorithm, DiffOp};
use tracing::debug;

use crate::config::{CompareMode, CompareOptions};
use crate::similarity::{Comparable, Scorer};

/// Candidates a before element keeps queued at a time
const QUEUED_PER_ELEMENT: usize = 16;

/// A matched pair of elements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair {
    pub before: usize,
    pub after: usize,
    pub similarity: f64,
    /// Relocated relative to the surrounding matches
    pub moved: bool,
    /// Part of the longest order-preserving chain
    pub chained: bool,
}

/// One element of the aligned output, in after-document order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Matched(Pair),
    Deleted(usize),
    Inserted(usize),
}

/// Result of aligning two sequences
#[derive(Debug, Clone, Default)]
pub struct Matching {
    /// Pairs sorted by before index
    pub pairs: Vec<Pair>,
    /// Unpaired before indices, ascending
    pub deleted: Vec<usize>,
    /// Unpaired after indices, ascending
    pub inserted: Vec<usize>,
    after_len: usize,
}

impl Matching {
    /// Number of moved pairs
    pub fn moved_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.moved).count()
    }

    /// Interleave pairs, deletions and insertions in after-document order
    ///
    /// A deletion is placed just before the first chained pair that follows
    /// it in the before document, or at the end when none does.
    pub fn steps(&self) -> Vec<Step> {
        let chain: Vec<&Pair> = self.pairs.iter().filter(|p| p.chained).collect();

        let mut keyed: Vec<((usize, u8, usize), Step)> =
            Vec::with_capacity(self.pairs.len() + self.deleted.len() + self.inserted.len());

        for pair in &self.pairs {
            keyed.push(((pair.after, 1, 0), Step::Matched(*pair)));
        }
        for &j in &self.inserted {
            keyed.push(((j, 1, 0), Step::Inserted(j)));
        }
        for &i in &self.deleted {
            let anchor = chain
                .iter()
                .find(|p| p.before > i)
                .map_or(self.after_len, |p| p.after);
            keyed.push(((anchor, 0, i), Step::Deleted(i)));
        }

        keyed.sort_by_key(|(key, _)| *key);
        keyed.into_iter().map(|(_, step)| step).collect()
    }
}

/// Elements of one side with their precomputed profiles
struct Side<'t, T: Comparable> {
    items: &'t [T],
    profiles: Vec<T::Profile>,
}

impl<'t, T: Comparable> Side<'t, T> {
    fn new(items: &'t [T], scorer: &Scorer<'_>) -> Self {
        Self {
            items,
            profiles: items.iter().map(|item| item.profile(scorer)).collect(),
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn score(&self, i: usize, other: &Side<'_, T>, j: usize, scorer: &Scorer<'_>) -> f64 {
        self.items[i].similarity(&self.profiles[i], &other.items[j], &other.profiles[j], scorer)
    }

    fn bound(&self, i: usize, other: &Side<'_, T>, j: usize, scorer: &Scorer<'_>) -> f64 {
        self.items[i].similarity_bound(&self.profiles[i], &other.items[j], &other.profiles[j], scorer)
    }
}

/// Align two sequences
pub fn align<T: Comparable>(before: &[T], after: &[T], options: &CompareOptions) -> Matching {
    let scorer = Scorer::new(options);
    let before = Side::new(before, &scorer);
    let after = Side::new(after, &scorer);
    let mut state = AlignState::new(before.len(), after.len());

    match options.mode {
        CompareMode::Positional => {
            state.exact_pass(&before, &after);
            let exact = state.pairs.len();
            for (olds, news) in state.gaps() {
                state.similarity_pass(&before, &after, &olds, &news, &scorer);
            }
            let local = state.pairs.len() - exact;
            let olds: Vec<usize> = state.free_before().collect();
            let news: Vec<usize> = state.free_after().collect();
            state.similarity_pass(&before, &after, &olds, &news, &scorer);
            let similar = state.pairs.len() - exact;
            if options.pair_replaced_images {
                state.replacement_pass(&before, &after, &scorer);
            }
            debug!(
                "Aligned {} x {} elements: {} exact, {} similar ({} within gaps), {} replaced",
                before.len(),
                after.len(),
                exact,
                similar,
                local,
                state.pairs.len() - exact - similar
            );
        }
        CompareMode::ContentBased => {
            let olds: Vec<usize> = (0..before.len()).collect();
            let news: Vec<usize> = (0..after.len()).collect();
            state.similarity_pass(&before, &after, &olds, &news, &scorer);
            debug!(
                "Aligned {} x {} elements by content: {} pairs",
                before.len(),
                after.len(),
                state.pairs.len()
            );
        }
    }

    let mut matching = state.finish();
    mark_chain(&mut matching.pairs);
    if options.mode == CompareMode::Positional {
        mark_moves(&mut matching.pairs);
    }
    matching
}

/// A possible pairing, valued by its score or by an upper bound of it
#[derive(Debug, Clone, Copy)]
struct Candidate {
    value: f64,
    scored: bool,
    before: usize,
    after: usize,
}

impl Candidate {
    fn distance(&self) -> usize {
        self.before.abs_diff(self.after)
    }
}

/// Greater means assigned earlier: higher value, bounds ahead of equal
/// scores, then nearest, then lowest indices
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then(other.scored.cmp(&self.scored))
            .then(other.distance().cmp(&self.distance()))
            .then(other.before.cmp(&self.before))
            .then(other.after.cmp(&self.after))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Queue entry; `Refill` stands in for a before element's candidates that
/// rank at or below the carried one and are not queued yet
#[derive(Debug)]
enum Queued {
    Candidate(Candidate),
    Refill(Candidate),
}

impl Queued {
    fn candidate(&self) -> &Candidate {
        match self {
            Queued::Candidate(c) | Queued::Refill(c) => c,
        }
    }

    fn is_refill(&self) -> bool {
        matches!(self, Queued::Refill(_))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.candidate()
            .cmp(other.candidate())
            .then(self.is_refill().cmp(&other.is_refill()))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

struct AlignState {
    pairs: Vec<Pair>,
    before_used: Vec<bool>,
    after_used: Vec<bool>,
}

impl AlignState {
    fn new(before_len: usize, after_len: usize) -> Self {
        Self {
            pairs: Vec::new(),
            before_used: vec![false; before_len],
            after_used: vec![false; after_len],
        }
    }

    fn pair(&mut self, before: usize, after: usize, similarity: f64) {
        self.before_used[before] = true;
        self.after_used[after] = true;
        self.pairs.push(Pair {
            before,
            after,
            similarity,
            moved: false,
            chained: false,
        });
    }

    fn free_before(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.before_used.len()).filter(|&i| !self.before_used[i])
    }

    fn free_after(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.after_used.len()).filter(|&j| !self.after_used[j])
    }

    /// Free elements grouped by the gap between chained matches they fall in
    fn gaps(&self) -> Vec<(Vec<usize>, Vec<usize>)> {
        let mut anchors = self.pairs.clone();
        anchors.sort_by_key(|p| p.before);
        mark_chain(&mut anchors);
        let chain: Vec<&Pair> = anchors.iter().filter(|p| p.chained).collect();

        let mut gaps: BTreeMap<usize, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
        for i in self.free_before() {
            let gap = chain.partition_point(|p| p.before < i);
            gaps.entry(gap).or_default().0.push(i);
        }
        for j in self.free_after() {
            let gap = chain.partition_point(|p| p.after < j);
            gaps.entry(gap).or_default().1.push(j);
        }
        gaps.into_values()
            .filter(|(olds, news)| !olds.is_empty() && !news.is_empty())
            .collect()
    }

    fn exact_pass<T: Comparable>(&mut self, before: &Side<'_, T>, after: &Side<'_, T>) {
        let old: Vec<&Fingerprint> = before.items.iter().map(|b| b.fingerprint()).collect();
        let new: Vec<&Fingerprint> = after.items.iter().map(|b| b.fingerprint()).collect();

        for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
            if let DiffOp::Equal {
                old_index,
                new_index,
                len,
            } = op
            {
                for k in 0..len {
                    self.pair(old_index + k, new_index + k, 1.0);
                }
            }
        }

        // Leftover duplicates pair up in original order
        let mut pending: BTreeMap<&Fingerprint, VecDeque<usize>> = BTreeMap::new();
        for i in self.free_before().collect::<Vec<_>>() {
            pending.entry(old[i]).or_default().push_back(i);
        }
        for j in self.free_after().collect::<Vec<_>>() {
            if let Some(i) = pending.get_mut(new[j]).and_then(|q| q.pop_front()) {
                self.pair(i, j, 1.0);
            }
        }
    }

    /// Greedy best-first assignment between `olds` and `news`
    fn similarity_pass<T: Comparable>(
        &mut self,
        before: &Side<'_, T>,
        after: &Side<'_, T>,
        olds: &[usize],
        news: &[usize],
        scorer: &Scorer<'_>,
    ) {
        let threshold = scorer.options().similarity_threshold;
        let mut queue = BinaryHeap::new();
        for &i in olds {
            self.enqueue(&mut queue, before, after, i, news, None, scorer);
        }

        while let Some(entry) = queue.pop() {
            let c = *entry.candidate();
            if self.before_used[c.before] {
                continue;
            }
            if let Queued::Refill(limit) = entry {
                self.enqueue(&mut queue, before, after, c.before, news, Some(limit), scorer);
                continue;
            }
            if self.after_used[c.after] {
                continue;
            }
            if c.scored {
                self.pair(c.before, c.after, c.value);
                continue;
            }
            let score = before.score(c.before, after, c.after, scorer);
            if score > threshold {
                queue.push(Queued::Candidate(Candidate {
                    value: score,
                    scored: true,
                    ..c
                }));
            }
        }
    }

    /// Queue the best candidates of before element `i` ranking at or below `limit`
    #[allow(clippy::too_many_arguments)]
    fn enqueue<T: Comparable>(
        &self,
        queue: &mut BinaryHeap<Queued>,
        before: &Side<'_, T>,
        after: &Side<'_, T>,
        i: usize,
        news: &[usize],
        limit: Option<Candidate>,
        scorer: &Scorer<'_>,
    ) {
        let threshold = scorer.options().similarity_threshold;
        let item = &before.items[i];

        let mut candidates: Vec<Candidate> = Vec::new();
        for &j in news {
            if self.after_used[j] || !item.compatible(&after.items[j]) {
                continue;
            }
            let candidate = if item.fingerprint() == after.items[j].fingerprint() {
                Candidate {
                    value: 1.0,
                    scored: true,
                    before: i,
                    after: j,
                }
            } else {
                Candidate {
                    value: before.bound(i, after, j, scorer),
                    scored: false,
                    before: i,
                    after: j,
                }
            };
            if candidate.value > threshold && limit.map_or(true, |l| candidate <= l) {
                candidates.push(candidate);
            }
        }

        candidates.sort_unstable_by(|a, b| b.cmp(a));
        let rest = candidates.split_off(candidates.len().min(QUEUED_PER_ELEMENT));
        queue.extend(candidates.into_iter().map(Queued::Candidate));
        if let Some(&next) = rest.first() {
            queue.push(Queued::Refill(next));
        }
    }

    fn replacement_pass<T: Comparable>(
        &mut self,
        before: &Side<'_, T>,
        after: &Side<'_, T>,
        scorer: &Scorer<'_>,
    ) {
        for (olds, news) in self.gaps() {
            let olds = olds.into_iter().filter(|&i| before.items[i].replaceable());
            let news = news.into_iter().filter(|&j| after.items[j].replaceable());
            for (i, j) in olds.zip(news) {
                if before.items[i].compatible(&after.items[j]) {
                    let score = before.score(i, after, j, scorer);
                    self.pair(i, j, score);
                }
            }
        }
    }

    fn finish(self) -> Matching {
        let mut pairs = self.pairs;
        pairs.sort_by_key(|p| p.before);
        Matching {
            deleted: (0..self.before_used.len())
                .filter(|&i| !self.before_used[i])
                .collect(),
            inserted: (0..self.after_used.len())
                .filter(|&j| !self.after_used[j])
                .collect(),
            after_len: self.after_used.len(),
            pairs,
        }
    }
}

/// Mark the longest chain of pairs increasing in both indices
///
/// `pairs` must be sorted by before index.
fn mark_chain(pairs: &mut [Pair]) {
    // tails[k]: index into pairs of the smallest tail of a chain of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; pairs.len()];

    for k in 0..pairs.len() {
        let after = pairs[k].after;
        let pos = tails.partition_point(|&t| pairs[t].after < after);
        if pos > 0 {
            prev[k] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(k);
        } else {
            tails[pos] = k;
        }
    }

    for pair in pairs.iter_mut() {
        pair.chained = false;
    }
    let mut cursor = tails.last().copied();
    while let Some(k) = cursor {
        pairs[k].chained = true;
        cursor = prev[k];
    }
}

/// Mark moved pairs; `pairs` must be sorted by before index with chain flags set
///
/// Chained pairs never cross each other, so only crossings with pairs
/// outside the chain are counted for them.
fn mark_moves(pairs: &mut [Pair]) {
    let crosses = |a: &Pair, b: &Pair| (a.before < b.before) != (a.after < b.after);
    let loose: Vec<usize> = (0..pairs.len()).filter(|&k| !pairs[k].chained).collect();

    // Rank among the matches in after-document order
    let mut by_after: Vec<usize> = (0..pairs.len()).collect();
    by_after.sort_by_key(|&k| pairs[k].after);
    let mut after_rank = vec![0; pairs.len()];
    for (rank, &k) in by_after.iter().enumerate() {
        after_rank[k] = rank;
    }

    let crossings: Vec<usize> = pairs
        .iter()
        .map(|p| {
            if p.chained {
                loose.iter().filter(|&&m| crosses(p, &pairs[m])).count()
            } else {
                pairs.iter().filter(|q| crosses(p, q)).count()
            }
        })
        .collect();

    let moved: Vec<bool> = pairs
        .iter()
        .enumerate()
        .map(|(k, p)| {
            after_rank[k] != k
                && (!p.chained
                    || loose.iter().any(|&m| {
                        after_rank[m] != m && crosses(p, &pairs[m]) && crossings[k] >= crossings[m]
                    }))
        })
        .collect();

    for (pair, moved) in pairs.iter_mut().zip(moved) {
        pair.moved = moved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdelta_model::{Block, BlockKind, DocumentModel, Image, Paragraph, Row, Table};

    fn paragraphs(texts: &[&str]) -> Vec<Block> {
        DocumentModel::from_kinds(
            texts
                .iter()
                .map(|t| BlockKind::Paragraph(Paragraph::plain(*t)))
                .collect(),
        )
        .blocks
    }

    fn positional() -> CompareOptions {
        CompareOptions::default()
    }

    fn content() -> CompareOptions {
        CompareOptions::with_mode(CompareMode::ContentBased)
    }

    fn summary(m: &Matching) -> Vec<(usize, usize, bool)> {
        m.pairs.iter().map(|p| (p.before, p.after, p.moved)).collect()
    }

    #[test]
    fn test_identical_sequences() {
        let a = paragraphs(&["one", "two", "three"]);
        let m = align(&a, &a, &positional());
        assert_eq!(
            summary(&m),
            vec![(0, 0, false), (1, 1, false), (2, 2, false)]
        );
        assert!(m.deleted.is_empty());
        assert!(m.inserted.is_empty());
    }

    #[test]
    fn test_empty_sequences() {
        let m = align::<Block>(&[], &[], &positional());
        assert!(m.pairs.is_empty());
        assert!(m.steps().is_empty());
    }

    #[test]
    fn test_swap_marks_both_moved() {
        let a = paragraphs(&["Alpha block", "Bravo block", "Charlie block"]);
        let b = paragraphs(&["Bravo block", "Alpha block", "Charlie block"]);
        let m = align(&a, &b, &positional());
        assert_eq!(
            summary(&m),
            vec![(0, 1, true), (1, 0, true), (2, 2, false)]
        );
    }

    #[test]
    fn test_rotation_marks_only_relocated_block() {
        let a = paragraphs(&["a1", "b2", "c3", "d4", "e5"]);
        let b = paragraphs(&["b2", "c3", "d4", "e5", "a1"]);
        let m = align(&a, &b, &positional());
        assert_eq!(m.moved_count(), 1);
        assert!(m.pairs[0].moved);
        assert_eq!(m.pairs[0].after, 4);
    }

    #[test]
    fn test_content_mode_never_moves() {
        let a = paragraphs(&["Alpha block", "Bravo block", "Charlie block"]);
        let b = paragraphs(&["Bravo block", "Alpha block", "Charlie block"]);
        let m = align(&a, &b, &content());
        assert_eq!(m.moved_count(), 0);
        assert_eq!(m.pairs.len(), 3);
        assert!(m.pairs.iter().all(|p| p.similarity == 1.0));
    }

    #[test]
    fn test_duplicates_pair_in_order() {
        let a = paragraphs(&["same", "x", "same"]);
        let b = paragraphs(&["same", "same"]);
        let m = align(&a, &b, &positional());
        assert_eq!(summary(&m), vec![(0, 0, false), (2, 1, false)]);
        assert_eq!(m.deleted, vec![1]);
    }

    #[test]
    fn test_similar_paragraph_matched() {
        let a = paragraphs(&["Intro", "The server costs 1000 dollars per month"]);
        let b = paragraphs(&["Intro", "The server costs 1500 dollars per month"]);
        let m = align(&a, &b, &positional());
        assert_eq!(m.pairs.len(), 2);
        assert!(m.pairs[1].similarity < 1.0);
        assert!(m.pairs[1].similarity > 0.9);
    }

    #[test]
    fn test_dissimilar_paragraphs_not_matched() {
        let a = paragraphs(&["completely different"]);
        let b = paragraphs(&["xyz"]);
        let m = align(&a, &b, &positional());
        assert!(m.pairs.is_empty());
        assert_eq!(m.deleted, vec![0]);
        assert_eq!(m.inserted, vec![0]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let a = paragraphs(&["abcd"]);
        let b = paragraphs(&["abxy"]);
        // text ratio 0.5, style 1.0 -> 0.55
        let options = CompareOptions {
            similarity_threshold: 0.55,
            ..Default::default()
        };
        assert!(align(&a, &b, &options).pairs.is_empty());
    }

    #[test]
    fn test_variant_mismatch_never_pairs() {
        let a = DocumentModel::from_kinds(vec![BlockKind::Table(Table::new(vec![
            Row::from_texts(&["x"]),
        ]))])
        .blocks;
        let b = paragraphs(&["x"]);
        let m = align(&a, &b, &positional());
        assert!(m.pairs.is_empty());
        let m = align(&a, &b, &content());
        assert!(m.pairs.is_empty());
    }

    #[test]
    fn test_tie_prefers_nearest() {
        let a = paragraphs(&["report draft v1"]);
        let b = paragraphs(&["report draft v2", "filler text here", "report draft v2"]);
        let m = align(&a, &b, &positional());
        assert_eq!(m.pairs[0].after, 0);
    }

    #[test]
    fn test_replaced_image_paired_in_gap() {
        let a = DocumentModel::from_kinds(vec![
            BlockKind::Paragraph(Paragraph::plain("before")),
            BlockKind::Image(Image::new("sha256:old")),
            BlockKind::Paragraph(Paragraph::plain("after")),
        ])
        .blocks;
        let b = DocumentModel::from_kinds(vec![
            BlockKind::Paragraph(Paragraph::plain("before")),
            BlockKind::Image(Image::new("sha256:new")),
            BlockKind::Paragraph(Paragraph::plain("after")),
        ])
        .blocks;

        let m = align(&a, &b, &positional());
        assert_eq!(m.pairs.len(), 3);
        assert_eq!(m.pairs[1].similarity, 0.0);
        assert!(!m.pairs[1].moved);

        let options = CompareOptions {
            pair_replaced_images: false,
            ..Default::default()
        };
        let m = align(&a, &b, &options);
        assert_eq!(m.pairs.len(), 2);
        assert_eq!(m.deleted, vec![1]);
        assert_eq!(m.inserted, vec![1]);
    }

    #[test]
    fn test_images_in_different_gaps_not_paired() {
        let a = DocumentModel::from_kinds(vec![
            BlockKind::Image(Image::new("sha256:old")),
            BlockKind::Paragraph(Paragraph::plain("anchor")),
        ])
        .blocks;
        let b = DocumentModel::from_kinds(vec![
            BlockKind::Paragraph(Paragraph::plain("anchor")),
            BlockKind::Image(Image::new("sha256:new")),
        ])
        .blocks;
        let m = align(&a, &b, &positional());
        assert_eq!(m.pairs.len(), 1);
    }

    #[test]
    fn test_steps_order() {
        // before: A X B      after: A B Y
        let a = paragraphs(&["Alpha", "zzzz qqqq", "Bravo"]);
        let b = paragraphs(&["Alpha", "Bravo", "Yankee inserted"]);
        let m = align(&a, &b, &positional());
        let steps = m.steps();
        assert_eq!(steps.len(), 4);
        assert!(matches!(steps[0], Step::Matched(Pair { before: 0, after: 0, .. })));
        assert_eq!(steps[1], Step::Deleted(1));
        assert!(matches!(steps[2], Step::Matched(Pair { before: 2, after: 1, .. })));
        assert_eq!(steps[3], Step::Inserted(2));
    }

    #[test]
    fn test_trailing_deletions_last() {
        let a = paragraphs(&["keep", "gone one", "gone two"]);
        let b = paragraphs(&["keep"]);
        let steps = align(&a, &b, &positional()).steps();
        assert_eq!(steps[1], Step::Deleted(1));
        assert_eq!(steps[2], Step::Deleted(2));
    }

    #[test]
    fn test_rows_align() {
        let a = vec![
            Row::from_texts(&["Item", "Cost"]),
            Row::from_texts(&["Server", "1000"]),
            Row::from_texts(&["Disk", "200"]),
        ];
        let mut b = a.clone();
        b.insert(2, Row::from_texts(&["Network", "300"]));
        let m = align(&a, &b, &positional());
        assert_eq!(
            summary(&m),
            vec![(0, 0, false), (1, 1, false), (2, 3, false)]
        );
        assert_eq!(m.inserted, vec![2]);
    }

    #[test]
    fn test_reversal_keeps_middle_in_place() {
        let a = paragraphs(&["Alpha block", "Bravo block", "Charlie block"]);
        let b = paragraphs(&["Charlie block", "Bravo block", "Alpha block"]);
        let m = align(&a, &b, &positional());
        assert_eq!(
            summary(&m),
            vec![(0, 2, true), (1, 1, false), (2, 0, true)]
        );
    }

    #[test]
    fn test_exact_partner_behind_higher_bounds() {
        // Letter swaps share every character with the original, so their
        // bounds tie with the exact copy and outnumber one queued batch
        let base = "abcdefgh";
        let mut texts: Vec<String> = Vec::new();
        for x in 0..8 {
            for y in x + 1..8 {
                let mut chars: Vec<char> = base.chars().collect();
                chars.swap(x, y);
                texts.push(chars.into_iter().collect());
            }
        }
        texts.push(base.to_string());
        assert!(texts.len() > QUEUED_PER_ELEMENT + 1);

        let after: Vec<&str> = texts.iter().map(String::as_str).collect();
        let m = align(&paragraphs(&[base]), &paragraphs(&after), &content());
        assert_eq!(summary(&m), vec![(0, texts.len() - 1, false)]);
        assert_eq!(m.pairs[0].similarity, 1.0);
    }

    /// Score every compatible pair, then assign best first
    fn exhaustive(before: &[Block], after: &[Block], options: &CompareOptions) -> Vec<(usize, usize)> {
        let scorer = Scorer::new(options);
        let mut candidates = Vec::new();
        for (i, b) in before.iter().enumerate() {
            for (j, a) in after.iter().enumerate() {
                if !b.compatible(a) {
                    continue;
                }
                let score = b.similarity(&b.profile(&scorer), a, &a.profile(&scorer), &scorer);
                if score > options.similarity_threshold {
                    candidates.push((score, i.abs_diff(j), i, j));
                }
            }
        }
        candidates.sort_by(|x, y| {
            y.0.total_cmp(&x.0)
                .then(x.1.cmp(&y.1))
                .then(x.2.cmp(&y.2))
                .then(x.3.cmp(&y.3))
        });

        let mut used_before = vec![false; before.len()];
        let mut used_after = vec![false; after.len()];
        let mut pairs = Vec::new();
        for (_, _, i, j) in candidates {
            if !used_before[i] && !used_after[j] {
                used_before[i] = true;
                used_after[j] = true;
                pairs.push((i, j));
            }
        }
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn test_every_clause_edited_matches_exhaustive_assignment() {
        let clause = |n: usize, fee: usize| {
            format!("Clause {}: the service fee is {} dollars per month", n, fee)
        };
        let before_texts: Vec<String> = (0..40).map(|n| clause(n, 100 + 7 * n)).collect();
        let after_texts: Vec<String> = (0..40)
            .map(|k| (k * 17) % 40)
            .map(|n| clause(n, 101 + 7 * n))
            .collect();
        let before = paragraphs(&before_texts.iter().map(String::as_str).collect::<Vec<_>>());
        let after = paragraphs(&after_texts.iter().map(String::as_str).collect::<Vec<_>>());

        for options in [positional(), content()] {
            let m = align(&before, &after, &options);
            let got: Vec<(usize, usize)> = m.pairs.iter().map(|p| (p.before, p.after)).collect();
            assert_eq!(got, exhaustive(&before, &after, &options));
            assert_eq!(got.len(), 40);
        }
    }

    #[test]
    fn test_same_gap_candidate_preferred() {
        let a = paragraphs(&["Alpha", "report draft version one", "Anchor", "Omega"]);
        let b = paragraphs(&[
            "Alpha",
            "report draft version two",
            "Anchor",
            "report draft version one!",
            "Omega",
        ]);

        let m = align(&a, &b, &positional());
        assert_eq!(
            summary(&m),
            vec![(0, 0, false), (1, 1, false), (2, 2, false), (3, 4, false)]
        );
        assert_eq!(m.inserted, vec![3]);

        let m = align(&a, &b, &content());
        assert!(m.pairs.iter().any(|p| p.before == 1 && p.after == 3));
    }
}
