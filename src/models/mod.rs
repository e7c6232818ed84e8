//! Core data models for dealtrack
//!
//! This module contains the data structures that describe a brokerage's
//! deals: transactions, their milestones and their documents.

pub mod document;
pub mod ids;
pub mod milestone;
pub mod money;
pub mod transaction;

pub use document::{Document, DocumentStatus, DocumentType};
pub use ids::{DocumentId, TransactionId};
pub use milestone::{Milestone, MilestoneKind, MilestoneStatus};
pub use money::Money;
pub use transaction::{
    Property, PropertyType, Transaction, TransactionStatus, TransactionType,
    TransactionValidationError,
};
