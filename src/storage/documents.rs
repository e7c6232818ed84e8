//! Document repository for JSON storage
//!
//! Documents live in `documents.json`, indexed by owning transaction.
//! Writes re-read the file under a `WriteLease` so concurrent CLI processes
//! never drop each other's documents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::{DealError, DealResult};
use crate::models::{Document, DocumentId, TransactionId};

use super::file_io::{read_json, write_json_atomic, WriteLease, LEASE_TIMEOUT};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct DocumentData {
    documents: Vec<Document>,
}

fn poisoned<T>(e: PoisonError<T>) -> DealError {
    DealError::Storage(format!("Document store lock poisoned: {}", e))
}

#[derive(Default)]
struct Indexed {
    by_id: HashMap<DocumentId, Document>,
    by_transaction: HashMap<TransactionId, Vec<DocumentId>>,
}

impl Indexed {
    fn insert(&mut self, doc: Document) {
        let ids = self.by_transaction.entry(doc.transaction_id).or_default();
        if !ids.contains(&doc.id) {
            ids.push(doc.id);
        }
        self.by_id.insert(doc.id, doc);
    }
}

/// Repository for document persistence
pub struct DocumentRepository {
    path: PathBuf,
    data: RwLock<Indexed>,
}

impl DocumentRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Indexed::default()),
        }
    }

    /// Load documents from disk and rebuild the index
    pub fn load(&self) -> DealResult<()> {
        let indexed = self.read_disk()?;
        *self.data.write().map_err(poisoned)? = indexed;
        Ok(())
    }

    fn read_disk(&self) -> DealResult<Indexed> {
        let file_data: DocumentData = read_json(&self.path)?;

        let mut indexed = Indexed::default();
        for doc in file_data.documents {
            indexed.insert(doc);
        }
        Ok(indexed)
    }

    fn persist(path: &Path, by_id: &HashMap<DocumentId, Document>) -> DealResult<()> {
        let mut documents: Vec<_> = by_id.values().cloned().collect();
        documents.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        write_json_atomic(path, &DocumentData { documents })
    }

    pub fn get(&self, id: DocumentId) -> DealResult<Option<Document>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.by_id.get(&id).cloned())
    }

    /// Find by full UUID or short `doc-xxxxxxxx` form
    pub fn find(&self, identifier: &str) -> DealResult<Option<Document>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.by_id.values().find(|d| d.id.matches(identifier)).cloned())
    }

    /// Documents attached to a transaction, oldest first
    pub fn get_by_transaction(&self, transaction_id: TransactionId) -> DealResult<Vec<Document>> {
        let data = self.data.read().map_err(poisoned)?;
        let ids = data
            .by_transaction
            .get(&transaction_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut documents: Vec<_> = ids.iter().filter_map(|id| data.by_id.get(id).cloned()).collect();
        documents.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(documents)
    }

    pub fn get_all(&self) -> DealResult<Vec<Document>> {
        let data = self.data.read().map_err(poisoned)?;
        let mut documents: Vec<_> = data.by_id.values().cloned().collect();
        documents.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(documents)
    }

    /// Insert or update a document and persist the change
    ///
    /// Merges into the on-disk snapshot under a `WriteLease`, keeping
    /// documents written by other processes since `load`.
    pub fn upsert(&self, doc: Document) -> DealResult<Document> {
        let mut data = self.data.write().map_err(poisoned)?;
        let _lease = WriteLease::acquire(&self.path, LEASE_TIMEOUT)?;

        let mut next = self.read_disk()?;
        if let Some(existing) = next.by_id.get(&doc.id) {
            if existing.transaction_id != doc.transaction_id {
                return Err(DealError::Validation(format!(
                    "Document {} cannot move between transactions",
                    doc.id
                )));
            }
        }

        next.insert(doc.clone());
        Self::persist(&self.path, &next.by_id)?;
        *data = next;
        Ok(doc)
    }
}
