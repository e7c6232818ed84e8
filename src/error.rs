//! Custom error types for dealtrack
//!
//! Lifecycle failures (`NotFound`, `OutOfOrder`, `AlreadyCompleted`,
//! `InvalidTransition`, `Conflict`) are typed so callers can react to each one;
//! the remaining variants cover configuration, storage and export plumbing.

use thiserror::Error;

/// The main error type for dealtrack operations
#[derive(Error, Debug)]
pub enum DealError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A milestone was completed before one of its canonical predecessors
    #[error("Milestone '{milestone}' cannot be completed before '{blocking}'")]
    OutOfOrder { milestone: String, blocking: String },

    /// A milestone was completed twice
    #[error("Milestone '{0}' is already completed")]
    AlreadyCompleted(String),

    /// Illegal status change
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// The stored record moved on since it was loaded
    #[error("Transaction {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl DealError {
    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for milestones
    pub fn milestone_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Milestone",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for documents
    pub fn document_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Document",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a concurrent-write collision
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether the caller may retry with a freshly loaded record
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }
}

impl From<std::io::Error> for DealError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DealError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for dealtrack operations
pub type DealResult<T> = Result<T, DealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DealError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = DealError::transaction_not_found("txn-1234abcd");
        assert_eq!(err.to_string(), "Transaction not found: txn-1234abcd");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_out_of_order_error() {
        let err = DealError::OutOfOrder {
            milestone: "Closing".into(),
            blocking: "Final Walkthrough".into(),
        };
        assert_eq!(
            err.to_string(),
            "Milestone 'Closing' cannot be completed before 'Final Walkthrough'"
        );
    }

    #[test]
    fn test_conflict_is_retryable() {
        let err = DealError::Conflict {
            id: "txn-1234abcd".into(),
            expected: 3,
            actual: 4,
        };
        assert!(err.is_conflict());
        assert!(err.is_retryable());
        assert!(!DealError::AlreadyCompleted("Closing".into()).is_retryable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let deal_err: DealError = io_err.into();
        assert!(matches!(deal_err, DealError::Io(_)));
    }
}
