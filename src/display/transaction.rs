//! Transaction display formatting
//!
//! List view (one row per transaction, via `tabled`) and the detail view
//! with the milestone timeline.

use chrono::NaiveDate;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Document, MilestoneStatus, Transaction};
use crate::reports::RiskAssessment;
use crate::services::TransactionSummary;

use super::report::{format_bar, format_risk_factors};

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Property")]
    address: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Closing")]
    closing: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Next Milestone")]
    next: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Docs")]
    docs: String,
}

/// Format a list of transaction summaries as a table
pub fn format_transaction_list(summaries: &[TransactionSummary], date_format: &str) -> String {
    if summaries.is_empty() {
        return "No transactions found.".to_string();
    }

    let rows = summaries.iter().map(|s| SummaryRow {
        id: s.id.to_string(),
        address: truncate(&s.address, 24),
        client: truncate(&s.client_ref, 18),
        status: s.status.to_string(),
        closing: format!(
            "{} ({})",
            s.closing_date.format(date_format),
            relative_days(s.days_until_closing)
        ),
        progress: format!("{:>3}%", s.progress),
        next: s
            .current_milestone
            .map(|m| m.label().to_string())
            .unwrap_or_else(|| "-".into()),
        risk: format!("{} ({})", s.risk.level, s.risk.score),
        docs: if s.outstanding_documents == 0 {
            "-".into()
        } else {
            format!("{} open", s.outstanding_documents)
        },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n{} transaction(s)", table, summaries.len())
}

/// Format transaction details with milestones, documents and risk
pub fn format_transaction_details(
    txn: &Transaction,
    risk: &RiskAssessment,
    documents: &[Document],
    today: NaiveDate,
    currency_symbol: &str,
) -> String {
    let mut output = String::new();
    let money = |m: crate::models::Money| m.format_with_symbol(currency_symbol);

    output.push_str(&format!("Transaction: {} (v{})\n", txn.id, txn.version));
    output.push_str(&format!("Property:    {}\n", txn.property.full_address()));
    output.push_str(&format!(
        "             {} {}, {}\n",
        txn.property.property_type,
        txn.transaction_type,
        money(txn.property.price)
    ));
    output.push_str(&format!("Client:      {}\n", txn.client_ref));
    output.push_str(&format!("Status:      {}\n", txn.status));
    output.push_str(&format!("Contract:    {}\n", txn.contract_date));
    output.push_str(&format!(
        "Closing:     {} ({})\n",
        txn.closing_date,
        relative_days(txn.days_until_closing(today))
    ));
    if let Some(actual) = txn.actual_closing_date {
        output.push_str(&format!("Closed on:   {}\n", actual));
    }

    let (listing, buyer) = txn.commission_split();
    output.push_str(&format!("Commission:  {}", money(txn.commission)));
    if let Some(rate) = txn.commission_rate {
        output.push_str(&format!(" ({:.2}%)", rate * 100.0));
    }
    output.push('\n');
    output.push_str(&format!(
        "             listing {} {}, buyer {} {}\n",
        txn.listing_agent_ref.as_deref().unwrap_or("(unassigned)"),
        money(listing),
        txn.buyer_agent_ref.as_deref().unwrap_or("(unassigned)"),
        money(buyer)
    ));

    output.push_str(&format!(
        "Progress:    {} {}%\n",
        format_bar(f64::from(txn.progress), 100.0, 20),
        txn.progress
    ));
    output.push_str(&format!("Risk:        {} ({})\n", risk.level, risk.score));
    output.push_str(&format_risk_factors(risk, "             "));

    if !txn.notes.is_empty() {
        output.push_str(&format!("Notes:       {}\n", txn.notes));
    }

    output.push_str("\nMilestones:\n");
    for m in &txn.milestones {
        let marker = match m.status {
            MilestoneStatus::Complete => "[x]",
            MilestoneStatus::InProgress => "[>]",
            MilestoneStatus::Scheduled => "[~]",
            MilestoneStatus::Pending => "[ ]",
        };
        let when = match m.completed_date {
            Some(done) => format!("done {}", done),
            None if m.is_overdue(today) => {
                format!("due {}, {} days overdue", m.planned_date, m.days_overdue(today))
            }
            None => format!("due {}", m.planned_date),
        };
        output.push_str(&format!("  {} {:<22} {}\n", marker, m.name.label(), when));
    }

    if !documents.is_empty() {
        output.push_str("\nDocuments:\n");
        for doc in documents {
            output.push_str(&format!(
                "  {} {:<22} {:<10} {} {}\n",
                doc.id,
                truncate(&doc.name, 22),
                doc.doc_type,
                doc.date,
                doc.status
            ));
        }
    }

    output
}

/// "in 3 days", "today", "2 days ago"
pub fn relative_days(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 0 => format!("in {} days", d),
        d => format!("{} days ago", -d),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::test_support::{date, transaction_with_completed};
    use crate::reports::compute_risk;

    #[test]
    fn test_relative_days() {
        assert_eq!(relative_days(0), "today");
        assert_eq!(relative_days(3), "in 3 days");
        assert_eq!(relative_days(-2), "2 days ago");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("123 Oak Street", 24), "123 Oak Street");
        assert_eq!(truncate("1600 Pennsylvania Avenue Northwest", 12), "1600 Penn...");
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_transaction_list(&[], "%Y-%m-%d"), "No transactions found.");
    }

    #[test]
    fn test_details_show_overdue_milestone() {
        let txn = transaction_with_completed(4);
        let today = date(2024, 8, 25);
        let risk = compute_risk(&txn, today);
        let out = format_transaction_details(&txn, &risk, &[], today, "$");

        assert!(out.contains("123 Oak Street, Austin, TX 78701"));
        assert!(out.contains("$450,000.00"));
        assert!(out.contains("in 3 days"));
        assert!(out.contains("Appraisal Complete"));
        assert!(out.contains("10 days overdue"));
        assert!(out.contains("Risk:        Medium (55)"));
    }
}
