//! Summary statistics over a change set

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::change::{Change, ChangeKind};
use crate::document::BlockVariant;

/// Counts of changes per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KindCounts {
    pub inserted: usize,
    pub deleted: usize,
    pub modified: usize,
    pub moved: usize,
    pub unchanged: usize,
}

impl KindCounts {
    fn record(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Inserted => self.inserted += 1,
            ChangeKind::Deleted => self.deleted += 1,
            ChangeKind::Modified => self.modified += 1,
            ChangeKind::Moved => self.moved += 1,
            ChangeKind::Unchanged => self.unchanged += 1,
        }
    }

    /// Count for one kind
    pub fn get(&self, kind: ChangeKind) -> usize {
        match kind {
            ChangeKind::Inserted => self.inserted,
            ChangeKind::Deleted => self.deleted,
            ChangeKind::Modified => self.modified,
            ChangeKind::Moved => self.moved,
            ChangeKind::Unchanged => self.unchanged,
        }
    }

    /// Sum over all kinds
    pub fn total(&self) -> usize {
        self.inserted + self.deleted + self.modified + self.moved + self.unchanged
    }

    /// Sum over all kinds except `Unchanged`
    pub fn changed(&self) -> usize {
        self.total() - self.unchanged
    }
}

/// Statistics of one comparison
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeStatistics {
    /// Counts over all entries
    pub counts: KindCounts,
    /// Counts split by block variant
    pub by_variant: BTreeMap<BlockVariant, KindCounts>,
    /// Blocks of the before document covered by the change set
    pub before_blocks: usize,
    /// Blocks of the after document covered by the change set
    pub after_blocks: usize,
}

impl ChangeStatistics {
    /// Tally a list of changes
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut stats = Self::default();
        for change in changes {
            stats.counts.record(change.kind);
            stats
                .by_variant
                .entry(change.variant)
                .or_default()
                .record(change.kind);
            if change.before.is_some() {
                stats.before_blocks += 1;
            }
            if change.after.is_some() {
                stats.after_blocks += 1;
            }
        }
        stats
    }

    /// Total number of entries
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    /// Share of entries of the given kind, in percent
    pub fn percent(&self, kind: ChangeKind) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(kind) as f64 / total as f64 * 100.0
    }

    /// Counts for one variant (zero when the variant never occurs)
    pub fn variant(&self, variant: BlockVariant) -> KindCounts {
        self.by_variant.get(&variant).copied().unwrap_or_default()
    }
}
