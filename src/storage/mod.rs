//! Storage layer for dealtrack
//!
//! JSON file persistence with atomic writes. Each repository keeps its
//! records in memory and writes through to disk on every change, merging
//! into the current file under a cross-process write lease.

pub mod documents;
pub mod file_io;
pub mod init;
pub mod transactions;

pub use documents::DocumentRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::{initialize_storage, seed_demo};
pub use transactions::TransactionRepository;

use crate::config::paths::DealPaths;
use crate::error::DealError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    pub transactions: TransactionRepository,
    pub documents: DocumentRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: DealPaths) -> Result<Self, DealError> {
        paths.ensure_directories()?;

        Ok(Self {
            transactions: TransactionRepository::new(paths.transactions_file()),
            documents: DocumentRepository::new(paths.documents_file()),
        })
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), DealError> {
        self.transactions.load()?;
        self.documents.load()?;
        Ok(())
    }
}
