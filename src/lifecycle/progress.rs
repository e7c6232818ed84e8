//! Progress calculation
//!
//! Progress is always scored against the full canonical sequence, so a record
//! that is missing a milestone entry cannot look further along than it is.

use crate::models::{MilestoneKind, Transaction};

/// Percentage of the canonical milestones that are complete (0-100)
pub fn compute_progress(txn: &Transaction) -> u8 {
    let completed = txn.completed_count().min(MilestoneKind::COUNT);
    let pct = (100.0 * completed as f64 / MilestoneKind::COUNT as f64).round();
    pct as u8
}

/// Recompute and cache progress on the record
pub fn refresh_progress(txn: &mut Transaction) -> u8 {
    txn.progress = compute_progress(txn);
    txn.progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::transaction_with_completed;

    #[test]
    fn test_progress_values() {
        assert_eq!(compute_progress(&transaction_with_completed(0)), 0);
        assert_eq!(compute_progress(&transaction_with_completed(1)), 14);
        assert_eq!(compute_progress(&transaction_with_completed(4)), 57);
        assert_eq!(compute_progress(&transaction_with_completed(5)), 71);
        assert_eq!(compute_progress(&transaction_with_completed(7)), 100);
    }

    #[test]
    fn test_missing_entry_still_counts_in_denominator() {
        let mut txn = transaction_with_completed(2);
        txn.milestones.retain(|m| m.name != MilestoneKind::FinalWalkthrough);
        assert_eq!(txn.milestones.len(), 6);
        // 2 of 7, not 2 of 6
        assert_eq!(compute_progress(&txn), 29);
    }

    #[test]
    fn test_refresh_caches_value() {
        let mut txn = transaction_with_completed(3);
        txn.progress = 0;
        assert_eq!(refresh_progress(&mut txn), 43);
        assert_eq!(txn.progress, 43);
    }
}
