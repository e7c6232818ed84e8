//! Transaction lifecycle rules
//!
//! Pure functions over a [`Transaction`](crate::models::Transaction): milestone
//! sequencing, the status state machine, progress and the default milestone
//! plan. Nothing here does I/O; persistence and notification happen in the
//! service layer.

pub mod plan;
pub mod progress;
pub mod sequencer;
pub mod status;

pub use plan::apply_default_plan;
pub use progress::{compute_progress, refresh_progress};
pub use sequencer::{complete_milestone, resolve_milestone};
pub use status::{advance_status, can_transition};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::models::{Milestone, MilestoneKind, Money, Property, PropertyType, Transaction};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Planned dates used by the fixture, one per canonical milestone
    pub const PLANNED: [(u32, u32); 7] = [
        (8, 1),
        (8, 5),
        (8, 7),
        (8, 10),
        (8, 15),
        (8, 26),
        (8, 28),
    ];

    /// A deal on 123 Oak Street with the first `completed` milestones done
    pub fn transaction_with_completed(completed: usize) -> Transaction {
        let property = Property {
            address: "123 Oak Street".into(),
            city: "Austin".into(),
            state: "TX".into(),
            zip: "78701".into(),
            price: Money::from_dollars(450_000),
            property_type: PropertyType::SingleFamily,
        };
        let mut txn = Transaction::new(
            property,
            "Sarah Johnson",
            date(2024, 8, 1),
            date(2024, 8, 28),
            Money::from_dollars(13_500),
        );
        txn.milestones = MilestoneKind::ALL
            .iter()
            .zip(PLANNED)
            .enumerate()
            .map(|(i, (kind, (m, d)))| {
                let planned = date(2024, m, d);
                if i < completed {
                    Milestone::completed_on(*kind, planned, planned)
                } else {
                    Milestone::new(*kind, planned)
                }
            })
            .collect();
        super::refresh_progress(&mut txn);
        txn
    }
}
