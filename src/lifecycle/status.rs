//! Transaction status state machine
//!
//! ```text
//! UnderContract -> InspectionPeriod -> ClearToClose -> Closed
//!       \________________\__________________\________-> Cancelled
//! ```
//!
//! Status changes are explicit agent decisions; completing milestones never
//! moves the status on its own.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::error::{DealError, DealResult};
use crate::models::{Transaction, TransactionStatus};

/// Whether `from -> to` is a legal transition
pub fn can_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
    if from.is_terminal() {
        return false;
    }
    to == TransactionStatus::Cancelled || from.successor() == Some(to)
}

/// Move the transaction to `new_status`
///
/// Closing records `today` as the actual closing date; either terminal state
/// archives the record.
pub fn advance_status(
    txn: &mut Transaction,
    new_status: TransactionStatus,
    today: NaiveDate,
) -> DealResult<()> {
    let from = txn.status;
    if !can_transition(from, new_status) {
        return Err(DealError::InvalidTransition {
            from: from.to_string(),
            to: new_status.to_string(),
        });
    }

    txn.status = new_status;
    if new_status == TransactionStatus::Closed {
        txn.actual_closing_date = Some(today);
    }
    if new_status.is_terminal() {
        txn.archived_at = Some(Utc::now());
    }
    txn.touch();

    debug!(transaction = %txn.id, %from, to = %new_status, "status advanced");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::{date, transaction_with_completed};
    use TransactionStatus::*;

    #[test]
    fn test_main_path() {
        let mut txn = transaction_with_completed(7);
        let today = date(2024, 8, 28);
        for next in [InspectionPeriod, ClearToClose, Closed] {
            advance_status(&mut txn, next, today).unwrap();
            assert_eq!(txn.status, next);
        }
        assert_eq!(txn.actual_closing_date, Some(today));
        assert!(txn.archived_at.is_some());
    }

    #[test]
    fn test_cancel_from_any_open_state() {
        for start in [UnderContract, InspectionPeriod, ClearToClose] {
            assert!(can_transition(start, Cancelled));
        }
        let mut txn = transaction_with_completed(2);
        advance_status(&mut txn, Cancelled, date(2024, 8, 9)).unwrap();
        assert!(txn.archived_at.is_some());
        assert_eq!(txn.actual_closing_date, None);
    }

    #[test]
    fn test_skipping_and_repeating_rejected() {
        assert!(!can_transition(UnderContract, ClearToClose));
        assert!(!can_transition(UnderContract, Closed));
        assert!(!can_transition(InspectionPeriod, InspectionPeriod));
        assert!(!can_transition(ClearToClose, UnderContract));
    }

    #[test]
    fn test_closed_is_final() {
        let mut txn = transaction_with_completed(7);
        txn.status = Closed;
        let before = txn.clone();
        for target in [UnderContract, InspectionPeriod, ClearToClose, Closed, Cancelled] {
            let err = advance_status(&mut txn, target, date(2024, 9, 1)).unwrap_err();
            assert!(matches!(err, DealError::InvalidTransition { .. }));
        }
        assert_eq!(txn, before);
    }

    #[test]
    fn test_cancelled_is_final() {
        assert!(!can_transition(Cancelled, UnderContract));
        assert!(!can_transition(Cancelled, Cancelled));
    }

    #[test]
    fn test_invalid_transition_message() {
        let mut txn = transaction_with_completed(1);
        let err = advance_status(&mut txn, Closed, date(2024, 8, 2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid status transition: Under Contract -> Closed"
        );
    }
}
