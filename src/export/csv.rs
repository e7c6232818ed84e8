//! CSV export
//!
//! One row per transaction with the derived columns (progress, risk, current
//! milestone) evaluated as of the export date, and one row per document.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{DealError, DealResult};
use crate::reports::{compute_risk_with, RiskPolicy};
use crate::storage::Storage;

fn export_err(e: csv::Error) -> DealError {
    DealError::Export(e.to_string())
}

#[derive(Debug, Serialize)]
struct TransactionRow<'a> {
    id: String,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    zip: &'a str,
    client: &'a str,
    #[serde(rename = "type")]
    transaction_type: String,
    property_type: String,
    status: String,
    price: f64,
    contract_date: NaiveDate,
    closing_date: NaiveDate,
    actual_closing_date: Option<NaiveDate>,
    progress: u8,
    current_milestone: &'a str,
    risk_score: u32,
    risk_level: String,
    commission: f64,
    listing_agent: &'a str,
    buyer_agent: &'a str,
    outstanding_documents: usize,
}

#[derive(Debug, Serialize)]
struct DocumentRow<'a> {
    id: String,
    transaction_id: String,
    name: &'a str,
    #[serde(rename = "type")]
    doc_type: String,
    date: NaiveDate,
    status: String,
}

/// Export all transactions to CSV
pub fn export_transactions_csv<W: Write>(
    storage: &Storage,
    today: NaiveDate,
    policy: &RiskPolicy,
    writer: W,
) -> DealResult<()> {
    let transactions = storage.transactions.get_all()?;

    let mut outstanding: HashMap<_, usize> = HashMap::new();
    for doc in storage.documents.get_all()? {
        if doc.is_outstanding() {
            *outstanding.entry(doc.transaction_id).or_default() += 1;
        }
    }

    let mut wtr = csv::Writer::from_writer(writer);
    for txn in &transactions {
        let risk = compute_risk_with(txn, today, policy);
        wtr.serialize(TransactionRow {
            id: txn.id.to_string(),
            address: &txn.property.address,
            city: &txn.property.city,
            state: &txn.property.state,
            zip: &txn.property.zip,
            client: &txn.client_ref,
            transaction_type: txn.transaction_type.to_string(),
            property_type: txn.property.property_type.to_string(),
            status: txn.status.to_string(),
            price: txn.property.price.as_dollars_f64(),
            contract_date: txn.contract_date,
            closing_date: txn.closing_date,
            actual_closing_date: txn.actual_closing_date,
            progress: txn.progress,
            current_milestone: txn.current_milestone().map(|m| m.name.label()).unwrap_or(""),
            risk_score: risk.score,
            risk_level: risk.level.to_string(),
            commission: txn.commission.as_dollars_f64(),
            listing_agent: txn.listing_agent_ref.as_deref().unwrap_or(""),
            buyer_agent: txn.buyer_agent_ref.as_deref().unwrap_or(""),
            outstanding_documents: outstanding.get(&txn.id).copied().unwrap_or(0),
        })
        .map_err(export_err)?;
    }

    wtr.flush()
        .map_err(|e| DealError::Export(e.to_string()))?;
    Ok(())
}

/// Export all documents to CSV
pub fn export_documents_csv<W: Write>(storage: &Storage, writer: W) -> DealResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for doc in storage.documents.get_all()? {
        wtr.serialize(DocumentRow {
            id: doc.id.to_string(),
            transaction_id: doc.transaction_id.to_string(),
            name: &doc.name,
            doc_type: doc.doc_type.to_string(),
            date: doc.date,
            status: doc.status.to_string(),
        })
        .map_err(export_err)?;
    }

    wtr.flush()
        .map_err(|e| DealError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DealPaths;
    use crate::storage::seed_demo;
    use tempfile::TempDir;

    fn demo_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(DealPaths::with_base_dir(temp_dir.path())).unwrap();
        seed_demo(&storage).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_transactions_csv() {
        let (_temp_dir, storage) = demo_storage();
        let today = NaiveDate::from_ymd_opt(2024, 8, 25).unwrap();

        let mut out = Vec::new();
        export_transactions_csv(&storage, today, &RiskPolicy::default(), &mut out).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[6], "type");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);

        let main_street = rows
            .iter()
            .find(|r| &r[1] == "123 Main Street")
            .unwrap();
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        assert_eq!(&main_street[col("progress")], "57");
        assert_eq!(&main_street[col("current_milestone")], "Appraisal Complete");
        assert_eq!(&main_street[col("outstanding_documents")], "2");
        assert_eq!(main_street[col("price")].parse::<f64>().unwrap(), 450_000.0);
    }

    #[test]
    fn test_documents_csv() {
        let (_temp_dir, storage) = demo_storage();
        let mut out = Vec::new();
        export_documents_csv(&storage, &mut out).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        assert_eq!(reader.records().count(), 12);
    }
}
