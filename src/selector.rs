//! Reference-Series Index Selection
//!
//! Decides which positions of the reference series must be fetched so that
//! every target block has both its own snapshot and the immediately
//! preceding one available for delta computation.

use std::collections::BTreeSet;
use tracing::debug;

use crate::models::ReferenceRecord;

/// Merge event sources into the target block set: deduplicated, ascending.
pub fn target_block_set(sources: &[&[u64]]) -> Vec<u64> {
    let set: BTreeSet<u64> = sources.iter().flat_map(|s| s.iter().copied()).collect();
    set.into_iter().collect()
}

/// Select the reference-series positions to fetch for the given targets.
///
/// For each target block found at position `p`, both `p` and `p - 1` are
/// included (`p - 1` is skipped for `p == 0`; no index before the start is
/// ever produced). A target block absent from the series contributes
/// nothing; not every target is guaranteed a reference reading, and the
/// report silently omits it. Output is ascending with duplicates removed.
pub fn select_indexes(targets: &[u64], reference: &[ReferenceRecord]) -> Vec<usize> {
    let mut selected = BTreeSet::new();
    for &target in targets {
        // The series is sorted by block number.
        match reference.binary_search_by_key(&target, |r| r.block) {
            Ok(p) => {
                selected.insert(p);
                if p > 0 {
                    selected.insert(p - 1);
                }
            }
            Err(_) => {
                debug!(block = target, "target block not in reference series, skipping");
            }
        }
    }
    selected.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn series(blocks: &[u64]) -> Vec<ReferenceRecord> {
        blocks
            .iter()
            .map(|&block| ReferenceRecord {
                block,
                total_pooled: BigInt::from(0u32),
            })
            .collect()
    }

    #[test]
    fn test_target_block_set_dedup_and_sort() {
        assert_eq!(target_block_set(&[&[300, 300], &[150]]), vec![150, 300]);
        assert_eq!(target_block_set(&[&[5, 3, 5], &[3, 1]]), vec![1, 3, 5]);
        assert!(target_block_set(&[]).is_empty());
    }

    #[test]
    fn test_selects_position_and_predecessor() {
        let reference = series(&[100, 200, 300]);
        assert_eq!(select_indexes(&[200], &reference), vec![0, 1]);
        assert_eq!(select_indexes(&[300], &reference), vec![1, 2]);
    }

    #[test]
    fn test_first_position_has_no_predecessor() {
        let reference = series(&[100, 200, 300]);
        // No negative index is ever produced.
        assert_eq!(select_indexes(&[100], &reference), vec![0]);
    }

    #[test]
    fn test_unmatched_target_contributes_nothing() {
        let reference = series(&[100, 200, 300]);
        assert!(select_indexes(&[250], &reference).is_empty());
        assert_eq!(select_indexes(&[250, 200], &reference), vec![0, 1]);
    }

    #[test]
    fn test_overlapping_targets_dedup() {
        let reference = series(&[100, 200, 300, 400]);
        // 300 pulls in {1,2}, 400 pulls in {2,3}; 2 appears once.
        assert_eq!(select_indexes(&[300, 400], &reference), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(select_indexes(&[], &series(&[100])).is_empty());
        assert!(select_indexes(&[100], &[]).is_empty());
    }
}
