//! JSON file I/O with atomic writes
//!
//! Writes go to a sibling temp file which is synced and then renamed over the
//! target, so a crash mid-write never leaves a truncated data file behind.
//!
//! Separate processes share the data files, so a read-modify-write cycle runs
//! under a `WriteLease`: an exclusively created `<file>.lock` next to the data
//! file, removed when the lease is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::DealError;

/// Read JSON from a file, returning `T::default()` if the file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, DealError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| DealError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| DealError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, sync, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), DealError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            DealError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| DealError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| DealError::Storage(format!("Failed to serialize data: {}", e)))?;
    writer
        .flush()
        .map_err(|e| DealError::Storage(format!("Failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| DealError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        DealError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// How long a writer waits for another process to release its lease
pub const LEASE_TIMEOUT: Duration = Duration::from_secs(5);

const LEASE_POLL: Duration = Duration::from_millis(20);

/// Exclusive write access to one data file across processes
#[derive(Debug)]
pub struct WriteLease {
    lock_path: PathBuf,
}

impl WriteLease {
    /// Wait up to `timeout` for the lease on `path`
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, DealError> {
        let lock_path = path.with_extension("json.lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DealError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let started = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(_) => return Ok(Self { lock_path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if started.elapsed() >= timeout {
                        return Err(DealError::Storage(format!(
                            "Timed out waiting for write lock {}; remove it if no other dealtrack process is running",
                            lock_path.display()
                        )));
                    }
                    thread::sleep(LEASE_POLL);
                }
                Err(e) => {
                    return Err(DealError::Storage(format!(
                        "Failed to create lock {}: {}",
                        lock_path.display(),
                        e
                    )))
                }
            }
        }
    }
}

impl Drop for WriteLease {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Ledger {
        entries: Vec<String>,
    }

    #[test]
    fn test_missing_file_reads_as_default() {
        let temp_dir = TempDir::new().unwrap();
        let data: Ledger = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(data, Ledger::default());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("ledger.json");
        let data = Ledger {
            entries: vec!["123 Oak Street".into()],
        };

        write_json_atomic(&path, &data).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join("ledger.json.tmp").exists());
        let loaded: Ledger = read_json(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        fs::write(&path, "not json").unwrap();

        let result: Result<Ledger, _> = read_json(&path);
        assert!(matches!(result, Err(DealError::Storage(_))));
    }

    #[test]
    fn test_lease_is_exclusive_until_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        let lease = WriteLease::acquire(&path, LEASE_TIMEOUT).unwrap();
        assert!(temp_dir.path().join("ledger.json.lock").exists());

        let blocked = WriteLease::acquire(&path, Duration::from_millis(50));
        assert!(matches!(blocked, Err(DealError::Storage(_))));

        drop(lease);
        assert!(!temp_dir.path().join("ledger.json.lock").exists());
        assert!(WriteLease::acquire(&path, LEASE_TIMEOUT).is_ok());
    }
}
