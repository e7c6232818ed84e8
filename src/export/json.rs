//! JSON export
//!
//! Dumps every transaction and document with schema versioning.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DealError, DealResult};
use crate::models::{Document, Transaction};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full store export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub transactions: Vec<Transaction>,
    pub documents: Vec<Document>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub transaction_count: usize,
    pub active_count: usize,
    pub document_count: usize,
    pub earliest_contract: Option<NaiveDate>,
    pub latest_closing: Option<NaiveDate>,
}

impl FullExport {
    /// Snapshot the store, refusing to export inconsistent data
    pub fn from_storage(storage: &Storage) -> DealResult<Self> {
        let transactions = storage.transactions.get_all()?;
        let documents = storage.documents.get_all()?;

        let metadata = ExportMetadata {
            transaction_count: transactions.len(),
            active_count: transactions.iter().filter(|t| t.is_active()).count(),
            document_count: documents.len(),
            earliest_contract: transactions.iter().map(|t| t.contract_date).min(),
            latest_closing: transactions.iter().map(|t| t.closing_date).max(),
        };

        let export = Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            transactions,
            documents,
            metadata,
        };
        export.validate().map_err(DealError::Export)?;
        Ok(export)
    }

    /// Check schema version, record consistency and document ownership
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        for txn in &self.transactions {
            txn.validate()
                .map_err(|e| format!("Transaction {}: {}", txn.id, e))?;
        }

        let transaction_ids: HashSet<_> = self.transactions.iter().map(|t| t.id).collect();
        if let Some(orphan) = self
            .documents
            .iter()
            .find(|d| !transaction_ids.contains(&d.transaction_id))
        {
            return Err(format!(
                "Document {} references unknown transaction {}",
                orphan.id, orphan.transaction_id
            ));
        }

        Ok(())
    }
}

/// Export the full store as JSON
pub fn export_full_json<W: Write + ?Sized>(storage: &Storage, writer: &mut W, pretty: bool) -> DealResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| DealError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DealPaths;
    use crate::models::{DocumentType, TransactionId};
    use crate::storage::seed_demo;
    use tempfile::TempDir;

    fn demo_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(DealPaths::with_base_dir(temp_dir.path())).unwrap();
        seed_demo(&storage).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_export_metadata() {
        let (_temp_dir, storage) = demo_storage();
        let export = FullExport::from_storage(&storage).unwrap();

        assert_eq!(export.metadata.transaction_count, 3);
        assert_eq!(export.metadata.document_count, 12);
        assert_eq!(
            export.metadata.earliest_contract,
            NaiveDate::from_ymd_opt(2024, 7, 20)
        );
        assert_eq!(
            export.metadata.latest_closing,
            NaiveDate::from_ymd_opt(2024, 9, 5)
        );
    }

    #[test]
    fn test_export_json_parses_back() {
        let (_temp_dir, storage) = demo_storage();
        let mut out = Vec::new();
        export_full_json(&storage, &mut out, true).unwrap();

        let parsed: FullExport = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.transactions.len(), 3);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_orphan_document_fails_validation() {
        let (_temp_dir, storage) = demo_storage();
        let mut export = FullExport::from_storage(&storage).unwrap();
        export.documents.push(Document::new(
            TransactionId::new(),
            "Stray Addendum",
            DocumentType::Contract,
            NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
        ));

        assert!(export.validate().unwrap_err().contains("unknown transaction"));
    }
}
