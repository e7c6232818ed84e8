//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Handlers print
//! their results and return errors to `main`.

pub mod document;
pub mod export;
pub mod report;
pub mod transaction;

pub use document::{handle_document_command, DocumentCommands};
pub use export::{handle_export_command, ExportCommands};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;

use crate::audit::ChangeLog;
use crate::config::settings::Settings;
use crate::error::{DealError, DealResult};
use crate::models::Money;
use crate::storage::Storage;

/// Everything a command handler needs
pub struct CliContext<'a> {
    pub storage: &'a Storage,
    pub settings: &'a Settings,
    pub change_log: &'a ChangeLog,
    /// Reference date for overdue, risk and closing-window calculations
    pub today: NaiveDate,
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date(value: &str) -> DealResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        DealError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", value))
    })
}

/// Parse a money argument such as `450000` or `$450,000.00`
pub fn parse_money(value: &str) -> DealResult<Money> {
    Money::parse(value).map_err(|e| {
        DealError::Validation(format!("Invalid amount '{}': {}", value, e))
    })
}
