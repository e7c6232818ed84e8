//! Document service
//!
//! Paperwork tracked against a transaction: add, list, and move through
//! review states.

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::audit::{ChangeEvent, ChangeNotifier};
use crate::error::{DealError, DealResult};
use crate::models::{Document, DocumentStatus, DocumentType, TransactionId};
use crate::storage::Storage;

/// Service for document management
pub struct DocumentService<'a> {
    storage: &'a Storage,
    notifier: &'a dyn ChangeNotifier,
    today: NaiveDate,
}

impl<'a> DocumentService<'a> {
    pub fn new(storage: &'a Storage, notifier: &'a dyn ChangeNotifier) -> Self {
        Self {
            storage,
            notifier,
            today: Local::now().date_naive(),
        }
    }

    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Attach a document to a transaction
    ///
    /// The document date defaults to today and the status to `Pending`.
    pub fn add(
        &self,
        transaction: &str,
        name: &str,
        doc_type: DocumentType,
        date: Option<NaiveDate>,
        status: Option<DocumentStatus>,
    ) -> DealResult<Document> {
        let txn = self
            .storage
            .transactions
            .find(transaction.trim())?
            .ok_or_else(|| DealError::transaction_not_found(transaction))?;

        let mut doc = Document::new(txn.id, name.trim(), doc_type, date.unwrap_or(self.today));
        if let Some(status) = status {
            doc.status = status;
        }
        doc.validate().map_err(DealError::Validation)?;

        let doc = self.storage.documents.upsert(doc)?;
        self.notifier.notify(&ChangeEvent::document_added(&doc));

        info!(document = %doc.id, transaction = %txn.id, name = %doc.name, "document added");
        Ok(doc)
    }

    /// Documents attached to a transaction, oldest first
    pub fn list(&self, transaction: &str) -> DealResult<Vec<Document>> {
        let txn = self
            .storage
            .transactions
            .find(transaction.trim())?
            .ok_or_else(|| DealError::transaction_not_found(transaction))?;
        self.storage.documents.get_by_transaction(txn.id)
    }

    /// Change a document's status
    pub fn set_status(&self, document: &str, status: DocumentStatus) -> DealResult<Document> {
        let before = self
            .storage
            .documents
            .find(document.trim())?
            .ok_or_else(|| DealError::document_not_found(document))?;

        if before.status == status {
            return Ok(before);
        }

        let mut after = before.clone();
        after.set_status(status);
        let after = self.storage.documents.upsert(after)?;
        self.notifier
            .notify(&ChangeEvent::document_updated(&before, &after));

        Ok(after)
    }

    /// Number of documents still pending or in review
    pub fn outstanding_count(&self, transaction_id: TransactionId) -> DealResult<usize> {
        Ok(self
            .storage
            .documents
            .get_by_transaction(transaction_id)?
            .iter()
            .filter(|d| d.is_outstanding())
            .count())
    }
}
