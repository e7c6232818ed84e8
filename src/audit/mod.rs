//! Change history for dealtrack
//!
//! Every committed mutation produces a `ChangeEvent` with before/after
//! snapshots and a field-level diff. Services hand events to a
//! `ChangeNotifier`; the default one is `ChangeLog`, an append-only JSONL
//! file next to the data directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use dealtrack::audit::{ChangeEvent, ChangeLog, ChangeNotifier};
//!
//! let log = ChangeLog::new(paths.change_log());
//! log.notify(&ChangeEvent::transaction_created(&txn));
//! ```

mod diff;
mod event;
mod logger;
mod notifier;

pub use diff::diff_summary;
pub use event::{ChangeEvent, ChangeKind};
pub use logger::ChangeLog;
pub use notifier::{ChangeNotifier, NoopNotifier};

#[cfg(test)]
pub(crate) use notifier::recording::RecordingNotifier;
