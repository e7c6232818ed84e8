//! Overdue milestone report
//!
//! Lists every incomplete milestone past its planned date across the active
//! portfolio, worst first. This is what an agent works through each morning.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{MilestoneKind, MilestoneStatus, Transaction, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueMilestone {
    pub transaction_id: TransactionId,
    pub address: String,
    pub milestone: MilestoneKind,
    pub status: MilestoneStatus,
    pub planned_date: NaiveDate,
    pub days_overdue: i64,
}

/// Collect overdue milestones, most overdue first
pub fn overdue_milestones(transactions: &[Transaction], today: NaiveDate) -> Vec<OverdueMilestone> {
    let mut rows: Vec<OverdueMilestone> = transactions
        .iter()
        .filter(|txn| txn.is_active())
        .flat_map(|txn| {
            txn.milestones
                .iter()
                .filter(move |m| m.is_overdue(today))
                .map(move |m| OverdueMilestone {
                    transaction_id: txn.id,
                    address: txn.property.address.clone(),
                    milestone: m.name,
                    status: m.status,
                    planned_date: m.planned_date,
                    days_overdue: m.days_overdue(today),
                })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.days_overdue
            .cmp(&a.days_overdue)
            .then(a.milestone.cmp(&b.milestone))
    });
    rows
}
