//! Append-only JSONL change log
//!
//! Each event is one JSON line, flushed as soon as it is written.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::error::{DealError, DealResult};

use super::event::ChangeEvent;
use super::notifier::ChangeNotifier;

/// Writes change events to the change log file
pub struct ChangeLog {
    log_path: PathBuf,
    // Serializes appends from concurrent notifiers within one process
    write_lock: Mutex<()>,
}

impl ChangeLog {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Append one event
    pub fn append(&self, event: &ChangeEvent) -> DealResult<()> {
        let json = serde_json::to_string(event)
            .map_err(|e| DealError::Json(format!("Failed to serialize change event: {}", e)))?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| DealError::Io(format!("Change log lock poisoned: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| DealError::Io(format!("Failed to open change log: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| DealError::Io(format!("Failed to write change event: {}", e)))?;
        file.flush()
            .map_err(|e| DealError::Io(format!("Failed to flush change log: {}", e)))?;

        Ok(())
    }

    /// All events, oldest first
    pub fn read_all(&self) -> DealResult<Vec<ChangeEvent>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| DealError::Io(format!("Failed to open change log: {}", e)))?;

        let mut events = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                DealError::Io(format!("Failed to read change log line {}: {}", line_num + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let event: ChangeEvent = serde_json::from_str(&line).map_err(|e| {
                DealError::Json(format!(
                    "Failed to parse change event at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            events.push(event);
        }

        Ok(events)
    }

    /// The last `count` events, optionally limited to one transaction
    pub fn read_recent(&self, count: usize, transaction_id: Option<&str>) -> DealResult<Vec<ChangeEvent>> {
        let mut events = self.read_all()?;
        if let Some(id) = transaction_id {
            events.retain(|e| e.transaction_id == id);
        }
        let start = events.len().saturating_sub(count);
        Ok(events.split_off(start))
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl ChangeNotifier for ChangeLog {
    fn notify(&self, event: &ChangeEvent) {
        if let Err(e) = self.append(event) {
            warn!(
                error = %e,
                kind = %event.kind,
                transaction = %event.transaction_id,
                "failed to record change event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::event::ChangeKind;
    use crate::lifecycle::test_support::transaction_with_completed;
    use tempfile::TempDir;

    fn create_test_log() -> (ChangeLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log = ChangeLog::new(temp_dir.path().join("changes.log"));
        (log, temp_dir)
    }

    #[test]
    fn test_append_and_read() {
        let (log, _temp) = create_test_log();
        let txn = transaction_with_completed(1);
        log.append(&ChangeEvent::transaction_created(&txn)).unwrap();

        let events = log.read_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::TransactionCreated);
        assert_eq!(events[0].transaction_id, txn.id.to_string());
    }

    #[test]
    fn test_read_recent_filters_by_transaction() {
        let (log, _temp) = create_test_log();
        let a = transaction_with_completed(1);
        let b = transaction_with_completed(2);
        for _ in 0..3 {
            log.append(&ChangeEvent::transaction_created(&a)).unwrap();
            log.append(&ChangeEvent::transaction_created(&b)).unwrap();
        }

        assert_eq!(log.read_recent(4, None).unwrap().len(), 4);
        let only_b = log.read_recent(10, Some(&b.id.to_string())).unwrap();
        assert_eq!(only_b.len(), 3);
        assert!(only_b.iter().all(|e| e.transaction_id == b.id.to_string()));
    }

    #[test]
    fn test_empty_log() {
        let (log, _temp) = create_test_log();
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_notify_swallows_write_failures() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let log = ChangeLog::new(temp_dir.path().to_path_buf());
        log.notify(&ChangeEvent::transaction_created(&transaction_with_completed(1)));
    }

    #[test]
    fn test_survives_reopen() {
        let (log, temp) = create_test_log();
        log.append(&ChangeEvent::transaction_created(&transaction_with_completed(1)))
            .unwrap();

        let reopened = ChangeLog::new(temp.path().join("changes.log"));
        assert_eq!(reopened.read_all().unwrap().len(), 1);
    }
}
