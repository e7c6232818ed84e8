//! Service layer for dealtrack
//!
//! The service layer provides business logic on top of the storage layer:
//! validation, version checks, derived fields and change notification.

pub mod document;
pub mod transaction;

pub use document::DocumentService;
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionService, TransactionSummary,
};
