//! Milestone model
//!
//! Milestones are the fixed checkpoints a deal passes through between contract
//! and closing. Their order is canonical: see [`MilestoneKind::ALL`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical milestones, declared in lifecycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    ContractSigned,
    InspectionScheduled,
    InspectionComplete,
    AppraisalOrdered,
    AppraisalComplete,
    FinalWalkthrough,
    Closing,
}

impl MilestoneKind {
    /// Every milestone in canonical order
    pub const ALL: [MilestoneKind; 7] = [
        Self::ContractSigned,
        Self::InspectionScheduled,
        Self::InspectionComplete,
        Self::AppraisalOrdered,
        Self::AppraisalComplete,
        Self::FinalWalkthrough,
        Self::Closing,
    ];

    /// Length of the canonical sequence
    pub const COUNT: usize = Self::ALL.len();

    /// Zero-based position in the canonical sequence
    pub fn position(&self) -> usize {
        *self as usize
    }

    /// Milestones that must be complete before this one
    pub fn predecessors(&self) -> &'static [MilestoneKind] {
        &Self::ALL[..self.position()]
    }

    /// Human-readable name ("Inspection Scheduled")
    pub fn label(&self) -> &'static str {
        match self {
            Self::ContractSigned => "Contract Signed",
            Self::InspectionScheduled => "Inspection Scheduled",
            Self::InspectionComplete => "Inspection Complete",
            Self::AppraisalOrdered => "Appraisal Ordered",
            Self::AppraisalComplete => "Appraisal Complete",
            Self::FinalWalkthrough => "Final Walkthrough",
            Self::Closing => "Closing",
        }
    }

    /// Parse a milestone name, ignoring case, spaces, dashes and underscores
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect();

        Self::ALL.into_iter().find(|kind| {
            let label: String = kind
                .label()
                .chars()
                .filter(|c| *c != ' ')
                .flat_map(|c| c.to_lowercase())
                .collect();
            label == normalized
        })
    }
}

impl fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress state of a single milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    Scheduled,
    InProgress,
    Complete,
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Scheduled => write!(f, "Scheduled"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Complete => write!(f, "Complete"),
        }
    }
}

/// A checkpoint within one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Which canonical milestone this is
    pub name: MilestoneKind,

    /// Date the milestone is planned for
    pub planned_date: NaiveDate,

    /// Whether the milestone has been completed
    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub status: MilestoneStatus,

    /// Date the milestone was actually completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Milestone {
    /// Create a pending milestone
    pub fn new(name: MilestoneKind, planned_date: NaiveDate) -> Self {
        Self {
            name,
            planned_date,
            completed: false,
            status: MilestoneStatus::Pending,
            completed_date: None,
            notes: String::new(),
        }
    }

    /// Create a milestone that is already complete
    pub fn completed_on(name: MilestoneKind, planned_date: NaiveDate, on: NaiveDate) -> Self {
        let mut milestone = Self::new(name, planned_date);
        milestone.mark_complete(on);
        milestone
    }

    /// Mark the milestone complete as of `on`
    pub fn mark_complete(&mut self, on: NaiveDate) {
        self.completed = true;
        self.status = MilestoneStatus::Complete;
        self.completed_date = Some(on);
    }

    /// Move a pending milestone forward once it becomes the next one up
    ///
    /// Pending milestones planned after `today` become `Scheduled`, the rest
    /// `InProgress`. Milestones in any other state are left alone.
    pub fn activate(&mut self, today: NaiveDate) {
        if self.status == MilestoneStatus::Pending && !self.completed {
            self.status = if self.planned_date > today {
                MilestoneStatus::Scheduled
            } else {
                MilestoneStatus::InProgress
            };
        }
    }

    /// Incomplete and planned before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.planned_date < today
    }

    /// Days past the planned date (0 when not overdue)
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.is_overdue(today) {
            (today - self.planned_date).num_days()
        } else {
            0
        }
    }

    /// Date used as the completion timestamp for stall detection
    pub fn activity_date(&self) -> Option<NaiveDate> {
        if self.completed {
            Some(self.completed_date.unwrap_or(self.planned_date))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_canonical_order() {
        assert!(MilestoneKind::ContractSigned < MilestoneKind::Closing);
        assert_eq!(MilestoneKind::COUNT, 7);
        assert_eq!(MilestoneKind::AppraisalOrdered.position(), 3);
        assert_eq!(
            MilestoneKind::InspectionComplete.predecessors(),
            &[
                MilestoneKind::ContractSigned,
                MilestoneKind::InspectionScheduled
            ]
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            MilestoneKind::parse("Final Walkthrough"),
            Some(MilestoneKind::FinalWalkthrough)
        );
        assert_eq!(
            MilestoneKind::parse("appraisal-complete"),
            Some(MilestoneKind::AppraisalComplete)
        );
        assert_eq!(
            MilestoneKind::parse("contract_signed"),
            Some(MilestoneKind::ContractSigned)
        );
        assert_eq!(MilestoneKind::parse("Closing"), Some(MilestoneKind::Closing));
        assert_eq!(MilestoneKind::parse("Title Search"), None);
    }

    #[test]
    fn test_activate() {
        let today = date(2024, 8, 10);

        let mut future = Milestone::new(MilestoneKind::AppraisalOrdered, date(2024, 8, 12));
        future.activate(today);
        assert_eq!(future.status, MilestoneStatus::Scheduled);

        let mut due = Milestone::new(MilestoneKind::AppraisalOrdered, today);
        due.activate(today);
        assert_eq!(due.status, MilestoneStatus::InProgress);

        let mut scheduled = Milestone::new(MilestoneKind::Closing, date(2024, 8, 1));
        scheduled.status = MilestoneStatus::Scheduled;
        scheduled.activate(today);
        assert_eq!(scheduled.status, MilestoneStatus::Scheduled);
    }

    #[test]
    fn test_overdue() {
        let today = date(2024, 8, 20);
        let m = Milestone::new(MilestoneKind::AppraisalComplete, date(2024, 8, 15));
        assert!(m.is_overdue(today));
        assert_eq!(m.days_overdue(today), 5);

        let done = Milestone::completed_on(
            MilestoneKind::AppraisalComplete,
            date(2024, 8, 15),
            date(2024, 8, 16),
        );
        assert!(!done.is_overdue(today));
        assert_eq!(done.activity_date(), Some(date(2024, 8, 16)));
    }
}
