//! Default milestone plan for new transactions
//!
//! Contract-side milestones are offset from the contract date, closing-side
//! ones from the closing date. Every date is kept within
//! `[contract_date, closing_date]`.

use chrono::{Days, NaiveDate};

use crate::models::{Milestone, MilestoneKind, Transaction};

use super::progress::refresh_progress;

/// Planned date for a milestone
pub fn planned_date(kind: MilestoneKind, contract: NaiveDate, closing: NaiveDate) -> NaiveDate {
    let date = match kind {
        MilestoneKind::ContractSigned => contract,
        MilestoneKind::InspectionScheduled => contract + Days::new(4),
        MilestoneKind::InspectionComplete => contract + Days::new(6),
        MilestoneKind::AppraisalOrdered => contract + Days::new(9),
        MilestoneKind::AppraisalComplete => contract + Days::new(14),
        MilestoneKind::FinalWalkthrough => closing - Days::new(2),
        MilestoneKind::Closing => closing,
    };
    date.clamp(contract, closing)
}

/// Fill in the canonical milestones
///
/// The contract is signed by definition, so `ContractSigned` starts complete
/// and the milestone after it is activated relative to `today`.
pub fn apply_default_plan(txn: &mut Transaction, today: NaiveDate) {
    let (contract, closing) = (txn.contract_date, txn.closing_date);

    txn.milestones = MilestoneKind::ALL
        .iter()
        .map(|kind| Milestone::new(*kind, planned_date(*kind, contract, closing)))
        .collect();

    if let Some(first) = txn.milestone_mut(MilestoneKind::ContractSigned) {
        first.mark_complete(contract);
    }
    if let Some(second) = txn.milestone_mut(MilestoneKind::InspectionScheduled) {
        second.activate(today);
    }

    refresh_progress(txn);
}
