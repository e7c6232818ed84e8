//! Milestone sequencer
//!
//! Completes milestones strictly in canonical order. Every check runs before
//! the record is touched, so a failed call leaves the transaction unchanged.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{DealError, DealResult};
use crate::models::{MilestoneKind, Transaction};

use super::progress::refresh_progress;

/// Resolve a milestone name against a transaction
pub fn resolve_milestone(txn: &Transaction, name: &str) -> DealResult<MilestoneKind> {
    let kind = MilestoneKind::parse(name).ok_or_else(|| DealError::milestone_not_found(name))?;
    if txn.milestone(kind).is_none() {
        return Err(DealError::milestone_not_found(format!(
            "{} (not tracked on {})",
            kind, txn.id
        )));
    }
    Ok(kind)
}

/// Mark `kind` complete on `completion_date`
///
/// The next milestone present in the list is activated relative to `today`.
/// Closed and cancelled transactions are archived and reject the call.
/// Returns the new progress percentage.
pub fn complete_milestone(
    txn: &mut Transaction,
    kind: MilestoneKind,
    completion_date: NaiveDate,
    today: NaiveDate,
) -> DealResult<u8> {
    if txn.status.is_terminal() {
        return Err(DealError::Validation(format!(
            "Transaction {} is {}; its milestones can no longer change",
            txn.id, txn.status
        )));
    }

    let milestone = txn
        .milestone(kind)
        .ok_or_else(|| DealError::milestone_not_found(kind.label()))?;

    if milestone.completed {
        return Err(DealError::AlreadyCompleted(kind.label().to_string()));
    }

    if let Some(blocking) = kind
        .predecessors()
        .iter()
        .find(|prior| !txn.is_completed(**prior))
    {
        return Err(DealError::OutOfOrder {
            milestone: kind.label().to_string(),
            blocking: blocking.label().to_string(),
        });
    }

    if let Some(milestone) = txn.milestone_mut(kind) {
        milestone.mark_complete(completion_date);
    }

    if let Some(next) = txn
        .milestones
        .iter_mut()
        .find(|m| m.name > kind && !m.completed)
    {
        next.activate(today);
    }

    let progress = refresh_progress(txn);
    txn.touch();

    debug!(
        transaction = %txn.id,
        milestone = %kind,
        progress,
        "milestone completed"
    );

    Ok(progress)
}
