//! Risk scoring
//!
//! A transaction's risk is recomputed from its current state on every read and
//! never stored. Three signals feed the score: overdue milestones, closing
//! pressure and inactivity. Weights live in [`RiskPolicy`] so they can be
//! tuned from settings without touching the scorer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lifecycle::compute_progress;
use crate::models::{MilestoneKind, Transaction};

/// Three-bucket risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Weights and thresholds for the risk score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Points per incomplete milestone past its planned date
    pub overdue_points: u32,
    /// Upper bound on the slippage contribution
    pub slippage_cap: u32,
    /// Points when closing is near and progress is behind
    pub closing_pressure_points: u32,
    /// "Near" means at most this many days until closing
    pub closing_pressure_days: i64,
    /// "Behind" means progress strictly below this percentage
    pub closing_pressure_progress: u8,
    /// Points when no milestone was completed recently
    pub stall_points: u32,
    /// "Recently" means within this many days
    pub stall_days: i64,
    /// Highest score still classified Low
    pub low_max: u32,
    /// Highest score still classified Medium
    pub medium_max: u32,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            overdue_points: 10,
            slippage_cap: 40,
            closing_pressure_points: 25,
            closing_pressure_days: 7,
            closing_pressure_progress: 90,
            stall_points: 20,
            stall_days: 14,
            low_max: 30,
            medium_max: 60,
        }
    }
}

impl RiskPolicy {
    /// Map a score to its level
    pub fn level_for(&self, score: u32) -> RiskLevel {
        if score <= self.low_max {
            RiskLevel::Low
        } else if score <= self.medium_max {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// One signal that contributed to a score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskFactor {
    ScheduleSlippage {
        overdue: Vec<MilestoneKind>,
        points: u32,
    },
    ClosingPressure {
        days_until_closing: i64,
        progress: u8,
        points: u32,
    },
    Stalled {
        days_idle: i64,
        points: u32,
    },
}

impl RiskFactor {
    pub fn points(&self) -> u32 {
        match self {
            Self::ScheduleSlippage { points, .. }
            | Self::ClosingPressure { points, .. }
            | Self::Stalled { points, .. } => *points,
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScheduleSlippage { overdue, points } => {
                let names: Vec<&str> = overdue.iter().map(|k| k.label()).collect();
                write!(f, "+{} overdue: {}", points, names.join(", "))
            }
            Self::ClosingPressure {
                days_until_closing,
                progress,
                points,
            } => write!(
                f,
                "+{} closing in {} days at {}% progress",
                points, days_until_closing, progress
            ),
            Self::Stalled { days_idle, points } => {
                write!(f, "+{} no milestone completed in {} days", points, days_idle)
            }
        }
    }
}

/// Output of the risk scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 0-100
    pub score: u32,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

impl RiskAssessment {
    fn none() -> Self {
        Self {
            score: 0,
            level: RiskLevel::Low,
            factors: Vec::new(),
        }
    }
}

/// Score a transaction as of `today` with the default weights
///
/// Closed and cancelled transactions score 0 with no factors. That covers
/// every signal, not just the stall check: an archived deal with milestones
/// left past their planned date or a closing date in the past is still Low.
pub fn compute_risk(txn: &Transaction, today: NaiveDate) -> RiskAssessment {
    compute_risk_with(txn, today, &RiskPolicy::default())
}

/// Score a transaction as of `today`
///
/// Closed and cancelled transactions carry no risk (see `compute_risk`).
pub fn compute_risk_with(txn: &Transaction, today: NaiveDate, policy: &RiskPolicy) -> RiskAssessment {
    if txn.status.is_terminal() {
        return RiskAssessment::none();
    }

    let mut factors = Vec::new();

    let overdue: Vec<MilestoneKind> = txn
        .milestones
        .iter()
        .filter(|m| m.is_overdue(today))
        .map(|m| m.name)
        .collect();
    if !overdue.is_empty() {
        let points = (overdue.len() as u32)
            .saturating_mul(policy.overdue_points)
            .min(policy.slippage_cap);
        factors.push(RiskFactor::ScheduleSlippage { overdue, points });
    }

    let days_until_closing = txn.days_until_closing(today);
    let progress = compute_progress(txn);
    if days_until_closing <= policy.closing_pressure_days
        && progress < policy.closing_pressure_progress
    {
        factors.push(RiskFactor::ClosingPressure {
            days_until_closing,
            progress,
            points: policy.closing_pressure_points,
        });
    }

    let days_idle = (today - txn.last_activity()).num_days();
    if days_idle > policy.stall_days {
        factors.push(RiskFactor::Stalled {
            days_idle,
            points: policy.stall_points,
        });
    }

    let score = factors.iter().map(RiskFactor::points).sum::<u32>().min(100);

    RiskAssessment {
        score,
        level: policy.level_for(score),
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::{date, transaction_with_completed};
    use crate::models::TransactionStatus;

    #[test]
    fn test_level_boundaries() {
        let policy = RiskPolicy::default();
        assert_eq!(policy.level_for(0), RiskLevel::Low);
        assert_eq!(policy.level_for(30), RiskLevel::Low);
        assert_eq!(policy.level_for(31), RiskLevel::Medium);
        assert_eq!(policy.level_for(60), RiskLevel::Medium);
        assert_eq!(policy.level_for(61), RiskLevel::High);
        assert_eq!(policy.level_for(100), RiskLevel::High);
    }

    #[test]
    fn test_on_track_transaction_is_low() {
        // Four milestones done, the last on 08-10; nothing overdue on 08-12
        let txn = transaction_with_completed(4);
        let risk = compute_risk(&txn, date(2024, 8, 12));
        assert_eq!(risk.score, 0);
        assert_eq!(risk.level, RiskLevel::Low);
        assert!(risk.factors.is_empty());
    }

    #[test]
    fn test_closing_soon_and_behind() {
        // 08-25: closing in 3 days, Appraisal Complete overdue, idle since 08-10
        let txn = transaction_with_completed(4);
        let risk = compute_risk(&txn, date(2024, 8, 25));

        assert!(risk.factors.contains(&RiskFactor::ClosingPressure {
            days_until_closing: 3,
            progress: 57,
            points: 25,
        }));
        assert!(risk.factors.contains(&RiskFactor::ScheduleSlippage {
            overdue: vec![MilestoneKind::AppraisalComplete],
            points: 10,
        }));
        assert!(risk.factors.contains(&RiskFactor::Stalled {
            days_idle: 15,
            points: 20,
        }));
        assert_eq!(risk.score, 55);
        assert!(risk.level >= RiskLevel::Medium);
    }

    #[test]
    fn test_slippage_is_capped() {
        // Only contract signed; by 08-27 five milestones are overdue
        let txn = transaction_with_completed(1);
        let risk = compute_risk(&txn, date(2024, 8, 27));
        let slippage = risk
            .factors
            .iter()
            .find(|f| matches!(f, RiskFactor::ScheduleSlippage { .. }))
            .unwrap();
        assert_eq!(slippage.points(), 40);
        // 40 + 25 + 20
        assert_eq!(risk.score, 85);
        assert_eq!(risk.level, RiskLevel::High);
    }

    #[test]
    fn test_score_is_clamped() {
        let policy = RiskPolicy {
            overdue_points: 50,
            slippage_cap: 100,
            ..RiskPolicy::default()
        };
        let txn = transaction_with_completed(1);
        let risk = compute_risk_with(&txn, date(2024, 8, 27), &policy);
        assert_eq!(risk.score, 100);
    }

    #[test]
    fn test_stall_boundary() {
        // Last completion 08-10: 14 days later is still fresh, 15 is stalled
        let txn = transaction_with_completed(4);
        let policy = RiskPolicy {
            closing_pressure_points: 0,
            overdue_points: 0,
            ..RiskPolicy::default()
        };
        assert_eq!(compute_risk_with(&txn, date(2024, 8, 24), &policy).score, 0);
        assert_eq!(compute_risk_with(&txn, date(2024, 8, 25), &policy).score, 20);
    }

    #[test]
    fn test_no_pressure_when_nearly_done() {
        let mut txn = transaction_with_completed(7);
        txn.milestones[6].completed = false;
        txn.milestones[6].status = crate::models::MilestoneStatus::Scheduled;
        txn.milestones[6].completed_date = None;
        // 6 of 7 = 86%, still under 90
        let risk = compute_risk(&txn, date(2024, 8, 27));
        assert!(risk
            .factors
            .iter()
            .any(|f| matches!(f, RiskFactor::ClosingPressure { .. })));

        let done = transaction_with_completed(7);
        let risk = compute_risk(&done, date(2024, 8, 27));
        assert!(risk.factors.is_empty());
    }

    #[test]
    fn test_terminal_transactions_carry_no_risk() {
        let mut txn = transaction_with_completed(1);
        txn.status = TransactionStatus::Cancelled;
        let risk = compute_risk(&txn, date(2024, 9, 30));
        assert_eq!(risk.score, 0);
        assert_eq!(risk.level, RiskLevel::Low);
    }

    #[test]
    fn test_compute_risk_is_pure() {
        let txn = transaction_with_completed(2);
        let snapshot = txn.clone();
        let today = date(2024, 8, 20);
        let first = compute_risk(&txn, today);
        let second = compute_risk(&txn, today);
        assert_eq!(first, second);
        assert_eq!(txn, snapshot);
    }
}
