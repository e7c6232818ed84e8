//! Display formatting for terminal output
//!
//! Turns models and report results into the text the CLI prints. Nothing
//! here reads storage.

pub mod document;
pub mod report;
pub mod transaction;

pub use document::format_document_list;
pub use report::{format_change_log, format_metrics, format_overdue, format_risk};
pub use transaction::{format_transaction_details, format_transaction_list};
