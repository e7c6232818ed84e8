//! Derived views over transactions
//!
//! Everything here is a pure function of the records passed in and the
//! reference date; results are recomputed on every read and never persisted.
//!
//! - `risk`: per-transaction risk score, level and contributing factors
//! - `portfolio`: dashboard aggregates across the whole book of business
//! - `overdue`: milestones past their planned date

pub mod overdue;
pub mod portfolio;
pub mod risk;

pub use overdue::{overdue_milestones, OverdueMilestone};
pub use portfolio::{aggregate, PortfolioMetrics};
pub use risk::{compute_risk, compute_risk_with, RiskAssessment, RiskFactor, RiskLevel, RiskPolicy};
