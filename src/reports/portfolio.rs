//! Portfolio metrics
//!
//! Aggregates over every transaction the brokerage holds: the figures shown at
//! the top of the transaction dashboard.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Money, Transaction, TransactionStatus};

use super::risk::{compute_risk_with, RiskLevel, RiskPolicy};

/// Dashboard-level aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Transactions not yet closed or cancelled
    pub total_active: usize,
    /// Active transactions closing within the next 7 days (inclusive)
    pub closing_this_week: usize,
    /// Active transactions with a High risk level
    pub at_risk: usize,
    /// Sum of property prices over active transactions
    pub total_volume: Money,
    /// Mean contract-to-close days over deals closed in the trailing window
    pub avg_days_to_close: f64,
    /// Closed / (closed + cancelled), as a percentage
    pub success_rate: f64,
    /// Number of deals the average was taken over
    pub closed_in_window: usize,
}

/// Aggregate metrics as of `today`
///
/// `window_days` bounds which closed deals feed `avg_days_to_close`.
pub fn aggregate(
    transactions: &[Transaction],
    today: NaiveDate,
    window_days: u32,
    policy: &RiskPolicy,
) -> PortfolioMetrics {
    let window_start = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN);

    let mut total_active = 0;
    let mut closing_this_week = 0;
    let mut at_risk = 0;
    let mut total_volume = Money::zero();
    let mut closed = 0usize;
    let mut cancelled = 0usize;
    let mut close_days: Vec<i64> = Vec::new();

    for txn in transactions {
        match txn.status {
            TransactionStatus::Closed => {
                closed += 1;
                let closed_on = txn.effective_closing_date();
                if closed_on >= window_start && closed_on <= today {
                    close_days.push((closed_on - txn.contract_date).num_days());
                }
            }
            TransactionStatus::Cancelled => cancelled += 1,
            _ => {
                total_active += 1;
                total_volume += txn.property.price;

                let days = txn.days_until_closing(today);
                if (0..=7).contains(&days) {
                    closing_this_week += 1;
                }

                if compute_risk_with(txn, today, policy).level == RiskLevel::High {
                    at_risk += 1;
                }
            }
        }
    }

    let avg_days_to_close = if close_days.is_empty() {
        0.0
    } else {
        close_days.iter().sum::<i64>() as f64 / close_days.len() as f64
    };

    let finished = closed + cancelled;
    let success_rate = if finished == 0 {
        0.0
    } else {
        closed as f64 * 100.0 / finished as f64
    };

    PortfolioMetrics {
        total_active,
        closing_this_week,
        at_risk,
        total_volume,
        avg_days_to_close,
        success_rate,
        closed_in_window: close_days.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::{date, transaction_with_completed};

    fn closed_deal(contract: NaiveDate, closed_on: NaiveDate) -> Transaction {
        let mut txn = transaction_with_completed(7);
        txn.contract_date = contract;
        txn.closing_date = closed_on;
        txn.actual_closing_date = Some(closed_on);
        txn.status = TransactionStatus::Closed;
        txn
    }

    #[test]
    fn test_empty_portfolio() {
        let metrics = aggregate(&[], date(2024, 8, 25), 90, &RiskPolicy::default());
        assert_eq!(metrics.total_active, 0);
        assert_eq!(metrics.total_volume, Money::zero());
        assert_eq!(metrics.avg_days_to_close, 0.0);
        assert_eq!(metrics.success_rate, 0.0);
        assert!(!metrics.success_rate.is_nan());
    }

    #[test]
    fn test_active_counts() {
        let today = date(2024, 8, 25);
        let on_track = transaction_with_completed(6);
        let behind = transaction_with_completed(1);
        let mut later = transaction_with_completed(2);
        later.closing_date = date(2024, 9, 20);
        let mut past_due = transaction_with_completed(6);
        past_due.closing_date = date(2024, 8, 24);

        let txns = vec![on_track, behind, later, past_due];
        let metrics = aggregate(&txns, today, 90, &RiskPolicy::default());

        assert_eq!(metrics.total_active, 4);
        // closing 08-28 twice; 09-20 too far; 08-24 already past
        assert_eq!(metrics.closing_this_week, 2);
        assert_eq!(metrics.total_volume, Money::from_dollars(1_800_000));
        assert!(metrics.at_risk >= 1);
    }

    #[test]
    fn test_avg_days_uses_trailing_window() {
        let today = date(2024, 8, 25);
        let txns = vec![
            closed_deal(date(2024, 7, 1), date(2024, 7, 31)), // 30 days
            closed_deal(date(2024, 7, 10), date(2024, 8, 13)), // 34 days
            closed_deal(date(2023, 1, 1), date(2023, 2, 1)),  // outside window
        ];
        let metrics = aggregate(&txns, today, 90, &RiskPolicy::default());
        assert_eq!(metrics.closed_in_window, 2);
        assert_eq!(metrics.avg_days_to_close, 32.0);
        assert_eq!(metrics.total_active, 0);
    }

    #[test]
    fn test_success_rate() {
        let today = date(2024, 8, 25);
        let mut cancelled = transaction_with_completed(2);
        cancelled.status = TransactionStatus::Cancelled;
        let txns = vec![
            closed_deal(date(2024, 7, 1), date(2024, 7, 31)),
            closed_deal(date(2024, 7, 2), date(2024, 8, 1)),
            closed_deal(date(2024, 7, 3), date(2024, 8, 2)),
            cancelled,
        ];
        let metrics = aggregate(&txns, today, 90, &RiskPolicy::default());
        assert_eq!(metrics.success_rate, 75.0);
    }

    #[test]
    fn test_terminal_deals_excluded_from_active_figures() {
        let today = date(2024, 8, 25);
        let mut cancelled = transaction_with_completed(1);
        cancelled.status = TransactionStatus::Cancelled;
        let metrics = aggregate(&[cancelled], today, 90, &RiskPolicy::default());
        assert_eq!(metrics.total_active, 0);
        assert_eq!(metrics.closing_this_week, 0);
        assert_eq!(metrics.at_risk, 0);
        assert_eq!(metrics.success_rate, 0.0);
    }
}
