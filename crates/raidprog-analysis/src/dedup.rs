//! Pull filtering and deduplication.
//!
//! The log service re-exports a pull when a log is uploaded more than once,
//! producing records that share a raw start offset. Only the record exported
//! last is kept.

use std::collections::HashMap;

use raidprog_core::document::PullDocument;

/// Removes pulls sharing a start offset, keeping the one latest in input order.
///
/// Survivors keep their relative order. Returns the surviving pulls and the
/// number of dropped duplicates.
#[must_use]
pub fn dedup_pulls(pulls: Vec<PullDocument>) -> (Vec<PullDocument>, usize) {
    let mut last_index = HashMap::with_capacity(pulls.len());
    for (i, pull) in pulls.iter().enumerate() {
        last_index.insert(pull.start_offset_ms, i);
    }

    let total = pulls.len();
    let survivors = pulls
        .into_iter()
        .enumerate()
        .filter(|(i, pull)| last_index.get(&pull.start_offset_ms) == Some(i))
        .map(|(_, pull)| pull)
        .collect::<Vec<_>>();
    let dropped = total - survivors.len();
    (survivors, dropped)
}

/// Removes trash pulls: boss id 0 or no phase markers at all.
#[must_use]
pub fn remove_trash(pulls: Vec<PullDocument>) -> (Vec<PullDocument>, usize) {
    let total = pulls.len();
    let encounters = pulls
        .into_iter()
        .filter(|p| !p.boss_id.is_trash() && !p.phase_markers.is_empty())
        .collect::<Vec<_>>();
    let dropped = total - encounters.len();
    (encounters, dropped)
}

#[cfg(test)]
mod tests {
    use raidprog_core::{BossId, PullId};

    use super::*;
    use crate::test_util::pull;

    fn ids(pulls: &[PullDocument]) -> Vec<u32> {
        pulls.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn test_empty_input() {
        let (pulls, dropped) = dedup_pulls(vec![]);
        assert!(pulls.is_empty());
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let input = vec![
            pull(1, 0, 60_000),
            pull(2, 100_000, 150_000),
            pull(3, 0, 60_000),
        ];
        let (pulls, dropped) = dedup_pulls(input);
        assert_eq!(ids(&pulls), [2, 3]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_output_length_is_input_minus_duplicates() {
        let input = vec![
            pull(1, 0, 10_000),
            pull(2, 20_000, 30_000),
            pull(3, 20_000, 30_000),
            pull(4, 40_000, 50_000),
            pull(5, 20_000, 31_000),
            pull(6, 0, 10_000),
        ];
        let (pulls, dropped) = dedup_pulls(input);
        assert_eq!(dropped, 3);
        assert_eq!(pulls.len(), 3);
        assert_eq!(ids(&pulls), [4, 5, 6]);
    }

    #[test]
    fn test_distinct_offsets_untouched() {
        let input = vec![pull(1, 0, 10), pull(2, 20, 30), pull(3, 40, 50)];
        let (pulls, dropped) = dedup_pulls(input);
        assert_eq!(ids(&pulls), [1, 2, 3]);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_remove_trash() {
        let mut trash = pull(1, 0, 10_000);
        trash.boss_id = BossId(0);
        let mut unphased = pull(2, 20_000, 30_000);
        unphased.phase_markers.clear();
        let real = pull(3, 40_000, 50_000);
        let (pulls, dropped) = remove_trash(vec![trash, unphased, real]);
        assert_eq!(dropped, 2);
        assert_eq!(pulls.len(), 1);
        assert_eq!(pulls[0].id, PullId(3));
    }
}
