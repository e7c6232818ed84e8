//! Change event data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Document, Transaction};

use super::diff::diff_summary;

/// What happened to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    TransactionCreated,
    MilestoneCompleted,
    StatusAdvanced,
    DocumentAdded,
    DocumentUpdated,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TransactionCreated => "CREATED",
            Self::MilestoneCompleted => "MILESTONE",
            Self::StatusAdvanced => "STATUS",
            Self::DocumentAdded => "DOC ADDED",
            Self::DocumentUpdated => "DOC UPDATED",
        };
        write!(f, "{}", s)
    }
}

/// One committed mutation, as written to the change log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub timestamp: DateTime<Utc>,

    pub kind: ChangeKind,

    /// Short id of the transaction the change belongs to
    pub transaction_id: String,

    /// Short id of the document, for document changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    /// Transaction version after the change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    /// Property address or document name
    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl ChangeEvent {
    pub fn transaction_created(txn: &Transaction) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: ChangeKind::TransactionCreated,
            transaction_id: txn.id.to_string(),
            document_id: None,
            version: Some(txn.version),
            label: txn.property.address.clone(),
            before: None,
            after: serde_json::to_value(txn).ok(),
            diff_summary: None,
        }
    }

    /// A committed update of a transaction
    pub fn transaction_updated(kind: ChangeKind, before: &Transaction, after: &Transaction) -> Self {
        let before_json = serde_json::to_value(before).ok();
        let after_json = serde_json::to_value(after).ok();
        let diff = match (&before_json, &after_json) {
            (Some(b), Some(a)) => diff_summary(b, a),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            kind,
            transaction_id: after.id.to_string(),
            document_id: None,
            version: Some(after.version),
            label: after.property.address.clone(),
            before: before_json,
            after: after_json,
            diff_summary: diff,
        }
    }

    pub fn document_added(doc: &Document) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: ChangeKind::DocumentAdded,
            transaction_id: doc.transaction_id.to_string(),
            document_id: Some(doc.id.to_string()),
            version: None,
            label: doc.name.clone(),
            before: None,
            after: serde_json::to_value(doc).ok(),
            diff_summary: None,
        }
    }

    pub fn document_updated(before: &Document, after: &Document) -> Self {
        let before_json = serde_json::to_value(before).ok();
        let after_json = serde_json::to_value(after).ok();
        let diff = match (&before_json, &after_json) {
            (Some(b), Some(a)) => diff_summary(b, a),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            kind: ChangeKind::DocumentUpdated,
            transaction_id: after.transaction_id.to_string(),
            document_id: Some(after.id.to_string()),
            version: None,
            label: after.name.clone(),
            before: before_json,
            after: after_json,
            diff_summary: diff,
        }
    }

    /// One-line rendering for `report changes`
    pub fn format_line(&self) -> String {
        let mut line = format!(
            "[{}] {:<11} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.transaction_id,
            self.label
        );
        if let Some(version) = self.version {
            line.push_str(&format!(" (v{})", version));
        }
        if let Some(diff) = &self.diff_summary {
            line.push_str(&format!("\n    {}", diff));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::{date, transaction_with_completed};
    use crate::models::{DocumentStatus, DocumentType, MilestoneKind};

    #[test]
    fn test_created_event_has_no_before() {
        let txn = transaction_with_completed(1);
        let event = ChangeEvent::transaction_created(&txn);

        assert_eq!(event.kind, ChangeKind::TransactionCreated);
        assert_eq!(event.version, Some(1));
        assert_eq!(event.label, "123 Oak Street");
        assert!(event.before.is_none());
        assert!(event.after.is_some());
    }

    #[test]
    fn test_update_event_diffs_milestones() {
        let before = transaction_with_completed(4);
        let mut after = before.clone();
        after.version = 2;
        after
            .milestone_mut(MilestoneKind::AppraisalComplete)
            .unwrap()
            .mark_complete(date(2024, 8, 15));

        let event = ChangeEvent::transaction_updated(ChangeKind::MilestoneCompleted, &before, &after);
        let diff = event.diff_summary.unwrap();
        assert!(diff.contains("milestones[4].completed: false -> true"));
        assert!(diff.contains("version: 1 -> 2"));
    }

    #[test]
    fn test_document_update_event() {
        let txn = transaction_with_completed(1);
        let before = Document::new(txn.id, "Loan Documents", DocumentType::Financial, date(2024, 8, 12));
        let mut after = before.clone();
        after.status = DocumentStatus::Approved;

        let event = ChangeEvent::document_updated(&before, &after);
        assert_eq!(event.document_id, Some(before.id.to_string()));
        assert!(event
            .diff_summary
            .unwrap()
            .contains("status: \"pending\" -> \"approved\""));
    }

    #[test]
    fn test_format_line() {
        let txn = transaction_with_completed(1);
        let line = ChangeEvent::transaction_created(&txn).format_line();
        assert!(line.contains("CREATED"));
        assert!(line.contains("123 Oak Street (v1)"));
    }
}
