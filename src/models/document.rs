//! Document model
//!
//! Paperwork attached to a transaction (purchase agreement, inspection report,
//! title report, ...). Each document belongs to exactly one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{DocumentId, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Contract,
    Report,
    Financial,
    Disclosure,
    Title,
}

impl DocumentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "contract" => Some(Self::Contract),
            "report" => Some(Self::Report),
            "financial" | "loan" => Some(Self::Financial),
            "disclosure" => Some(Self::Disclosure),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract => write!(f, "Contract"),
            Self::Report => write!(f, "Report"),
            Self::Financial => write!(f, "Financial"),
            Self::Disclosure => write!(f, "Disclosure"),
            Self::Title => write!(f, "Title"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    InReview,
    Complete,
    Signed,
    Approved,
    Clear,
}

impl DocumentStatus {
    /// Still waiting on someone
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Pending | Self::InReview)
    }

    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(|c| c.to_lowercase())
            .collect();
        match normalized.as_str() {
            "pending" => Some(Self::Pending),
            "inreview" | "review" => Some(Self::InReview),
            "complete" | "completed" => Some(Self::Complete),
            "signed" => Some(Self::Signed),
            "approved" => Some(Self::Approved),
            "clear" | "cleared" => Some(Self::Clear),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::InReview => write!(f, "In Review"),
            Self::Complete => write!(f, "Complete"),
            Self::Signed => write!(f, "Signed"),
            Self::Approved => write!(f, "Approved"),
            Self::Clear => write!(f, "Clear"),
        }
    }
}

/// A document tracked against a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,

    /// Owning transaction
    pub transaction_id: TransactionId,

    pub name: String,

    pub doc_type: DocumentType,

    /// Date the document was issued or is due
    pub date: NaiveDate,

    #[serde(default)]
    pub status: DocumentStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        transaction_id: TransactionId,
        name: impl Into<String>,
        doc_type: DocumentType,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            transaction_id,
            name: name.into(),
            doc_type,
            date,
            status: DocumentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style status override, used when seeding existing paperwork
    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn set_status(&mut self, status: DocumentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn is_outstanding(&self) -> bool {
        self.status.is_outstanding()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Document name cannot be empty".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_outstanding() {
        assert_eq!(DocumentStatus::parse("In Review"), Some(DocumentStatus::InReview));
        assert_eq!(DocumentStatus::parse("signed"), Some(DocumentStatus::Signed));
        assert_eq!(DocumentStatus::parse("lost"), None);
        assert!(DocumentStatus::Pending.is_outstanding());
        assert!(DocumentStatus::InReview.is_outstanding());
        assert!(!DocumentStatus::Clear.is_outstanding());
    }

    #[test]
    fn test_new_document_is_pending() {
        let doc = Document::new(
            TransactionId::new(),
            "Inspection Report",
            DocumentType::Report,
            NaiveDate::from_ymd_opt(2024, 8, 7).unwrap(),
        );
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let doc = Document::new(
            TransactionId::new(),
            "  ",
            DocumentType::Title,
            NaiveDate::from_ymd_opt(2024, 8, 12).unwrap(),
        );
        assert!(doc.validate().is_err());
    }
}
