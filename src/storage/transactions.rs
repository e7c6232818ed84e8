//! Transaction repository for JSON storage
//!
//! Keeps every transaction in memory behind a `RwLock` and mirrors it to
//! `transactions.json`. Updates are compare-and-swap on the record's
//! `version` as stored on disk: a writer holding a stale copy gets
//! `DealError::Conflict`, whether the newer write came from this process or
//! another one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::{DealError, DealResult};
use crate::lifecycle::refresh_progress;
use crate::models::{Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic, WriteLease, LEASE_TIMEOUT};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

fn poisoned<T>(e: PoisonError<T>) -> DealError {
    DealError::Storage(format!("Transaction store lock poisoned: {}", e))
}

/// Repository for transaction persistence with version stamps
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk, rejecting inconsistent records
    pub fn load(&self) -> DealResult<()> {
        let loaded = self.read_disk()?;
        debug!(count = loaded.len(), "transactions loaded");
        *self.data.write().map_err(poisoned)? = loaded;
        Ok(())
    }

    /// Current on-disk snapshot, validated record by record
    fn read_disk(&self) -> DealResult<HashMap<TransactionId, Transaction>> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut loaded = HashMap::with_capacity(file_data.transactions.len());
        for mut txn in file_data.transactions {
            txn.validate().map_err(|e| {
                DealError::Storage(format!("Invalid transaction {} in store: {}", txn.id, e))
            })?;
            refresh_progress(&mut txn);
            if loaded.insert(txn.id, txn).is_some() {
                warn!(path = %self.path.display(), "duplicate transaction id in store, keeping last");
            }
        }
        Ok(loaded)
    }

    fn persist(path: &Path, data: &HashMap<TransactionId, Transaction>) -> DealResult<()> {
        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(|a, b| {
            a.closing_date
                .cmp(&b.closing_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        write_json_atomic(path, &TransactionData { transactions })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> DealResult<Option<Transaction>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(&id).cloned())
    }

    /// Find by full UUID or short `txn-xxxxxxxx` form
    pub fn find(&self, identifier: &str) -> DealResult<Option<Transaction>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.values().find(|t| t.id.matches(identifier)).cloned())
    }

    /// All transactions, earliest closing first
    pub fn get_all(&self) -> DealResult<Vec<Transaction>> {
        let data = self.data.read().map_err(poisoned)?;
        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(|a, b| {
            a.closing_date
                .cmp(&b.closing_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(transactions)
    }

    pub fn count(&self) -> DealResult<usize> {
        Ok(self.data.read().map_err(poisoned)?.len())
    }

    /// Store a new transaction and persist it
    ///
    /// The write merges into the on-disk snapshot under a `WriteLease`, so
    /// records written by other processes since `load` are kept.
    pub fn insert(&self, txn: Transaction) -> DealResult<Transaction> {
        let mut data = self.data.write().map_err(poisoned)?;
        let _lease = WriteLease::acquire(&self.path, LEASE_TIMEOUT)?;

        let mut next = self.read_disk()?;
        if next.contains_key(&txn.id) {
            return Err(DealError::Validation(format!(
                "Transaction {} already exists",
                txn.id
            )));
        }

        next.insert(txn.id, txn.clone());
        Self::persist(&self.path, &next)?;
        *data = next;
        Ok(txn)
    }

    /// Replace a transaction if the stored version is still `expected_version`
    ///
    /// The version is checked against the file on disk, not the snapshot taken
    /// by `load`, so a writer in another process that got there first makes
    /// this call fail with `Conflict`. On success the stored record carries
    /// `expected_version + 1` and is returned. Nothing is written when this
    /// fails.
    pub fn commit(&self, mut txn: Transaction, expected_version: u64) -> DealResult<Transaction> {
        let mut data = self.data.write().map_err(poisoned)?;
        let _lease = WriteLease::acquire(&self.path, LEASE_TIMEOUT)?;

        let mut next = self.read_disk()?;
        let current = next
            .get(&txn.id)
            .ok_or_else(|| DealError::transaction_not_found(txn.id.to_string()))?;
        if current.version != expected_version {
            let actual = current.version;
            // Pick up what the other writer committed
            *data = next;
            return Err(DealError::Conflict {
                id: txn.id.to_string(),
                expected: expected_version,
                actual,
            });
        }

        txn.version = expected_version + 1;
        next.insert(txn.id, txn.clone());
        Self::persist(&self.path, &next)?;
        *data = next;

        debug!(transaction = %txn.id, version = txn.version, "transaction committed");
        Ok(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::transaction_with_completed;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let txn = repo.insert(transaction_with_completed(3)).unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();
        let loaded = repo2.get(txn.id).unwrap().unwrap();
        assert_eq!(loaded, txn);
        assert_eq!(loaded.progress, 43);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = repo.insert(transaction_with_completed(1)).unwrap();
        assert!(repo.insert(txn).is_err());
    }

    #[test]
    fn test_commit_bumps_version() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = repo.insert(transaction_with_completed(1)).unwrap();
        assert_eq!(txn.version, 1);

        let mut edited = txn.clone();
        edited.notes = "Buyer requested extension".into();
        let committed = repo.commit(edited, 1).unwrap();

        assert_eq!(committed.version, 2);
        assert_eq!(repo.get(txn.id).unwrap().unwrap().version, 2);
    }

    #[test]
    fn test_stale_commit_conflicts_and_changes_nothing() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = repo.insert(transaction_with_completed(1)).unwrap();
        repo.commit(txn.clone(), 1).unwrap();

        let mut stale = txn.clone();
        stale.notes = "stale edit".into();
        let err = repo.commit(stale, 1).unwrap_err();

        assert!(matches!(
            err,
            DealError::Conflict {
                expected: 1,
                actual: 2,
                ..
            }
        ));
        assert!(repo.get(txn.id).unwrap().unwrap().notes.is_empty());
    }

    #[test]
    fn test_commit_unknown_is_not_found() {
        let (_temp_dir, repo) = create_test_repo();
        let err = repo.commit(transaction_with_completed(1), 1).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_find_by_short_id() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = repo.insert(transaction_with_completed(1)).unwrap();
        let found = repo.find(&txn.id.to_string()).unwrap().unwrap();
        assert_eq!(found.id, txn.id);
        assert!(repo.find("txn-ffffffff").unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_skipped_milestones() {
        let (temp_dir, repo) = create_test_repo();
        let mut bad = transaction_with_completed(1);
        bad.milestones[3].mark_complete(bad.contract_date);
        write_json_atomic(
            temp_dir.path().join("transactions.json"),
            &TransactionData {
                transactions: vec![bad],
            },
        )
        .unwrap();

        assert!(matches!(repo.load(), Err(DealError::Storage(_))));
    }

    #[test]
    fn test_commit_checks_version_on_disk() {
        let (temp_dir, repo) = create_test_repo();
        let txn = repo.insert(transaction_with_completed(1)).unwrap();

        let other = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        other.load().unwrap();
        let mut theirs = txn.clone();
        theirs.notes = "Appraisal gap agreed".into();
        other.commit(theirs, 1).unwrap();

        let mut ours = txn.clone();
        ours.notes = "stale edit".into();
        let err = repo.commit(ours, 1).unwrap_err();
        assert!(matches!(err, DealError::Conflict { actual: 2, .. }));
        assert_eq!(
            repo.get(txn.id).unwrap().unwrap().notes,
            "Appraisal gap agreed"
        );
    }

    #[test]
    fn test_insert_keeps_records_from_other_writers() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let other = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        other.load().unwrap();
        let theirs = other.insert(transaction_with_completed(2)).unwrap();

        let ours = repo.insert(transaction_with_completed(1)).unwrap();

        let reopened = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reopened.load().unwrap();
        assert_eq!(reopened.count().unwrap(), 2);
        assert!(reopened.get(theirs.id).unwrap().is_some());
        assert!(reopened.get(ours.id).unwrap().is_some());
    }
}
