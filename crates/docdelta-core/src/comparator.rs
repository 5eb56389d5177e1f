//! Document comparison entry points
//!
//! [`Comparator`] validates both models, classifies their blocks and checks
//! that every block of either side is accounted for exactly once before the
//! change set is returned.

use docdelta_model::{Block, BlockKind, ChangeSet, DocumentModel, Side};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::config::{CompareMode, CompareOptions};
use crate::error::{ConfigError, InternalConsistencyError};

/// Result type for comparisons
pub type Result<T> = std::result::Result<T, InternalConsistencyError>;

/// Compares document models under validated options
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    options: CompareOptions,
}

impl Comparator {
    /// Create a comparator, rejecting invalid options
    pub fn new(options: CompareOptions) -> std::result::Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Default options with the given mode
    pub fn with_mode(mode: CompareMode) -> Self {
        Self {
            options: CompareOptions::with_mode(mode),
        }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compare two document snapshots
    pub fn compare(&self, before: &DocumentModel, after: &DocumentModel) -> Result<ChangeSet> {
        validate_model(before, Side::Before)?;
        validate_model(after, Side::After)?;
        debug!(
            before = before.len(),
            after = after.len(),
            mode = %self.options.mode,
            "comparing documents"
        );

        let changes = Classifier::new(&self.options).classify_blocks(&before.blocks, &after.blocks);
        check_totality(&changes, before.len(), Side::Before)?;
        check_totality(&changes, after.len(), Side::After)?;

        let stats = changes.statistics();
        info!(
            inserted = stats.counts.inserted,
            deleted = stats.counts.deleted,
            modified = stats.counts.modified,
            moved = stats.counts.moved,
            unchanged = stats.counts.unchanged,
            "comparison complete"
        );
        Ok(changes)
    }

    /// Compare independent document pairs in parallel, preserving order
    pub fn compare_many(&self, pairs: &[(DocumentModel, DocumentModel)]) -> Vec<Result<ChangeSet>> {
        pairs
            .par_iter()
            .map(|(before, after)| self.compare(before, after))
            .collect()
    }
}

/// Compare two documents with default options in the given mode
pub fn compare(
    before: &DocumentModel,
    after: &DocumentModel,
    mode: CompareMode,
) -> Result<ChangeSet> {
    Comparator::with_mode(mode).compare(before, after)
}

/// Compare many document pairs with shared options
pub fn compare_many(
    pairs: &[(DocumentModel, DocumentModel)],
    options: CompareOptions,
) -> std::result::Result<Vec<Result<ChangeSet>>, ConfigError> {
    Ok(Comparator::new(options)?.compare_many(pairs))
}

/// Check positions and fingerprints, recursing into table cells
///
/// Errors inside a table report the table's top-level position.
fn validate_model(model: &DocumentModel, side: Side) -> Result<()> {
    for (position, block) in model.blocks.iter().enumerate() {
        if block.index != position {
            return Err(InternalConsistencyError::IndexMismatch {
                side,
                position,
                index: block.index,
            });
        }
        if !block_is_fingerprinted(block) {
            return Err(InternalConsistencyError::MissingFingerprint {
                side,
                index: position,
            });
        }
    }
    Ok(())
}

fn block_is_fingerprinted(block: &Block) -> bool {
    if block.fingerprint.is_empty() {
        return false;
    }
    match &block.kind {
        BlockKind::Table(table) => table.rows.iter().all(|row| {
            !row.fingerprint.is_empty()
                && row.cells.iter().all(|cell| {
                    cell.blocks
                        .iter()
                        .enumerate()
                        .all(|(i, b)| b.index == i && block_is_fingerprinted(b))
                })
        }),
        BlockKind::Paragraph(_) | BlockKind::Image(_) => true,
    }
}

/// Every index of one side must appear in exactly one change
fn check_totality(changes: &ChangeSet, len: usize, side: Side) -> Result<()> {
    let mut counts = vec![0usize; len];
    for change in changes.iter() {
        if let Some(index) = change.index(side) {
            match counts.get_mut(index) {
                Some(count) => *count += 1,
                None => {
                    return Err(InternalConsistencyError::IncompleteMatching {
                        side,
                        index,
                        count: 1,
                    })
                }
            }
        }
    }

    match counts.iter().position(|&c| c != 1) {
        Some(index) => Err(InternalConsistencyError::IncompleteMatching {
            side,
            index,
            count: counts[index],
        }),
        None => Ok(()),
    }
}
