//! Storage initialization
//!
//! First-run setup, plus an optional demo book of business: three deals in
//! different stages with their paperwork, dated August 2024.

use chrono::NaiveDate;
use tracing::info;

use crate::config::paths::DealPaths;
use crate::error::{DealError, DealResult};
use crate::models::{
    Document, DocumentStatus, DocumentType, Milestone, MilestoneKind, MilestoneStatus, Money,
    Property, PropertyType, Transaction, TransactionStatus,
};

use super::Storage;

/// Initialize storage for a fresh installation
pub fn initialize_storage(paths: &DealPaths) -> DealResult<()> {
    paths.ensure_directories()
}

/// Load the demo transactions into an empty store
///
/// Returns the number of transactions created.
pub fn seed_demo(storage: &Storage) -> DealResult<usize> {
    if storage.transactions.count()? > 0 {
        return Err(DealError::Validation(
            "Store already contains transactions; demo data is only loaded into an empty store"
                .into(),
        ));
    }

    let deals = demo_transactions()?;
    let count = deals.len();
    for (txn, documents) in deals {
        storage.transactions.insert(txn)?;
        for doc in documents {
            storage.documents.upsert(doc)?;
        }
    }

    info!(count, "demo transactions seeded");
    Ok(count)
}

fn ymd(s: &str) -> DealResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DealError::Validation(format!("Bad demo date {}: {}", s, e)))
}

struct DemoDeal {
    address: &'static str,
    zip: &'static str,
    price: i64,
    property_type: PropertyType,
    client: &'static str,
    status: TransactionStatus,
    contract: &'static str,
    closing: &'static str,
    listing_agent: &'static str,
    buyer_agent: &'static str,
    commission: i64,
    milestones: [(&'static str, MilestoneStatus); 7],
    documents: &'static [(&'static str, DocumentType, &'static str, DocumentStatus)],
}

const DEMO_DEALS: [DemoDeal; 3] = [
    DemoDeal {
        address: "123 Main Street",
        zip: "12345",
        price: 450_000,
        property_type: PropertyType::SingleFamily,
        client: "John Smith",
        status: TransactionStatus::UnderContract,
        contract: "2024-08-01",
        closing: "2024-08-28",
        listing_agent: "Sarah Johnson",
        buyer_agent: "Mike Rodriguez",
        commission: 13_500,
        milestones: [
            ("2024-08-01", MilestoneStatus::Complete),
            ("2024-08-05", MilestoneStatus::Complete),
            ("2024-08-07", MilestoneStatus::Complete),
            ("2024-08-10", MilestoneStatus::Complete),
            ("2024-08-15", MilestoneStatus::InProgress),
            ("2024-08-26", MilestoneStatus::Pending),
            ("2024-08-28", MilestoneStatus::Pending),
        ],
        documents: &[
            ("Purchase Agreement", DocumentType::Contract, "2024-08-01", DocumentStatus::Signed),
            ("Inspection Report", DocumentType::Report, "2024-08-07", DocumentStatus::Complete),
            ("Appraisal Report", DocumentType::Report, "2024-08-15", DocumentStatus::Pending),
            ("Loan Documents", DocumentType::Financial, "2024-08-12", DocumentStatus::InReview),
        ],
    },
    DemoDeal {
        address: "456 Oak Avenue",
        zip: "12346",
        price: 325_000,
        property_type: PropertyType::Condo,
        client: "Sarah Wilson",
        status: TransactionStatus::InspectionPeriod,
        contract: "2024-08-08",
        closing: "2024-09-05",
        listing_agent: "Jennifer Lee",
        buyer_agent: "Robert Taylor",
        commission: 9_750,
        milestones: [
            ("2024-08-08", MilestoneStatus::Complete),
            ("2024-08-12", MilestoneStatus::Complete),
            ("2024-08-14", MilestoneStatus::InProgress),
            ("2024-08-17", MilestoneStatus::Pending),
            ("2024-08-24", MilestoneStatus::Pending),
            ("2024-09-03", MilestoneStatus::Pending),
            ("2024-09-05", MilestoneStatus::Pending),
        ],
        documents: &[
            ("Purchase Agreement", DocumentType::Contract, "2024-08-08", DocumentStatus::Signed),
            ("Seller Disclosures", DocumentType::Disclosure, "2024-08-09", DocumentStatus::Complete),
            ("Inspection Report", DocumentType::Report, "2024-08-14", DocumentStatus::Pending),
        ],
    },
    DemoDeal {
        address: "789 Pine Road",
        zip: "12347",
        price: 650_000,
        property_type: PropertyType::SingleFamily,
        client: "Mike Davis",
        status: TransactionStatus::ClearToClose,
        contract: "2024-07-20",
        closing: "2024-08-25",
        listing_agent: "Sarah Johnson",
        buyer_agent: "Michael Rodriguez",
        commission: 19_500,
        milestones: [
            ("2024-07-20", MilestoneStatus::Complete),
            ("2024-07-25", MilestoneStatus::Complete),
            ("2024-07-27", MilestoneStatus::Complete),
            ("2024-07-30", MilestoneStatus::Complete),
            ("2024-08-05", MilestoneStatus::Complete),
            ("2024-08-23", MilestoneStatus::Scheduled),
            ("2024-08-25", MilestoneStatus::Scheduled),
        ],
        documents: &[
            ("Purchase Agreement", DocumentType::Contract, "2024-07-20", DocumentStatus::Signed),
            ("Inspection Report", DocumentType::Report, "2024-07-27", DocumentStatus::Complete),
            ("Appraisal Report", DocumentType::Report, "2024-08-05", DocumentStatus::Complete),
            ("Loan Documents", DocumentType::Financial, "2024-08-10", DocumentStatus::Approved),
            ("Title Report", DocumentType::Title, "2024-08-12", DocumentStatus::Clear),
        ],
    },
];

/// Build the demo transactions with their documents
pub fn demo_transactions() -> DealResult<Vec<(Transaction, Vec<Document>)>> {
    DEMO_DEALS.iter().map(build_demo_deal).collect()
}

fn build_demo_deal(deal: &DemoDeal) -> DealResult<(Transaction, Vec<Document>)> {
    let property = Property {
        address: deal.address.into(),
        city: "Anytown".into(),
        state: "CA".into(),
        zip: deal.zip.into(),
        price: Money::from_dollars(deal.price),
        property_type: deal.property_type,
    };

    let commission = Money::from_dollars(deal.commission);
    let mut txn = Transaction::new(
        property,
        deal.client,
        ymd(deal.contract)?,
        ymd(deal.closing)?,
        commission,
    );
    txn.status = deal.status;
    txn.commission_rate = Some(deal.commission as f64 / deal.price as f64);
    txn.listing_agent_ref = Some(deal.listing_agent.into());
    txn.buyer_agent_ref = Some(deal.buyer_agent.into());

    txn.milestones = MilestoneKind::ALL
        .iter()
        .zip(deal.milestones.iter())
        .map(|(kind, (planned, status))| {
            let planned = ymd(planned)?;
            Ok(if *status == MilestoneStatus::Complete {
                Milestone::completed_on(*kind, planned, planned)
            } else {
                let mut m = Milestone::new(*kind, planned);
                m.status = *status;
                m
            })
        })
        .collect::<DealResult<Vec<_>>>()?;
    crate::lifecycle::refresh_progress(&mut txn);

    txn.validate()
        .map_err(|e| DealError::Validation(e.to_string()))?;

    let documents = deal
        .documents
        .iter()
        .map(|(name, doc_type, date, status)| {
            Ok(Document::new(txn.id, *name, *doc_type, ymd(date)?).with_status(*status))
        })
        .collect::<DealResult<Vec<_>>>()?;

    Ok((txn, documents))
}
