//! dealtrack - real-estate transaction lifecycle engine
//!
//! Tracks each deal through seven canonical milestones, enforces their order,
//! derives progress and a risk score, and aggregates portfolio metrics for a
//! brokerage dashboard.
//!
//! # Architecture
//!
//! - `config`: paths and settings
//! - `error`: error types
//! - `models`: transactions, milestones, documents, money, ids
//! - `lifecycle`: milestone sequencing, status machine, progress, default plan
//! - `reports`: risk scoring, portfolio metrics, overdue milestones
//! - `storage`: JSON file repositories with version stamps
//! - `services`: business operations with compare-and-swap commits
//! - `audit`: change events, the change log and the notifier seam
//! - `export`: JSON, YAML and CSV export
//! - `display`, `cli`: terminal front end
//!
//! # Example
//!
//! ```rust,ignore
//! use dealtrack::config::{paths::DealPaths, settings::Settings};
//! use dealtrack::audit::NoopNotifier;
//! use dealtrack::services::TransactionService;
//! use dealtrack::storage::Storage;
//!
//! let paths = DealPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let service = TransactionService::new(&storage, &settings, &NoopNotifier);
//! let txn = service.complete_milestone("txn-1a2b3c4d", Some(3), "inspection complete", None)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{DealError, DealResult};
