//! Transaction CLI commands

use clap::Subcommand;

use crate::display::{format_transaction_details, format_transaction_list};
use crate::error::{DealError, DealResult};
use crate::models::{Property, PropertyType, TransactionStatus, TransactionType};
use crate::reports::{compute_risk_with, RiskLevel};
use crate::services::{CreateTransactionInput, DocumentService, TransactionFilter, TransactionService};

use super::{parse_date, parse_money, CliContext};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Open a new transaction with the default milestone plan
    Create {
        /// Street address
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        zip: String,
        /// Purchase price (e.g. "450000" or "$450,000")
        #[arg(short, long)]
        price: String,
        /// Client name or CRM reference
        #[arg(short, long)]
        client: String,
        /// Contract date (YYYY-MM-DD)
        #[arg(long)]
        contract: String,
        /// Scheduled closing date (YYYY-MM-DD)
        #[arg(long)]
        closing: String,
        /// Property type (single-family, condo, townhouse, multi-family, land, other)
        #[arg(long, default_value = "single-family")]
        property_type: String,
        /// Transaction type (purchase, sale, lease)
        #[arg(long = "type", default_value = "purchase")]
        transaction_type: String,
        /// Total commission; derived from the rate when omitted
        #[arg(long)]
        commission: Option<String>,
        /// Commission rate (e.g. 0.03); defaults to the configured rate
        #[arg(long, conflicts_with = "commission")]
        rate: Option<f64>,
        #[arg(long)]
        listing_agent: Option<String>,
        #[arg(long)]
        buyer_agent: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List transactions
    List {
        /// Filter by status (under-contract, inspection-period, clear-to-close, closed, cancelled)
        #[arg(long)]
        status: Option<String>,
        /// Filter by risk level (low, medium, high)
        #[arg(long)]
        risk: Option<String>,
        /// Only deals closing within this many days
        #[arg(long)]
        closing_within: Option<i64>,
        /// Only deals where this agent is listing or buyer agent
        #[arg(long)]
        agent: Option<String>,
        /// Include closed and cancelled deals
        #[arg(short, long)]
        all: bool,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show transaction details
    Show {
        /// Transaction ID (full UUID or txn-xxxxxxxx)
        id: String,
    },
    /// Complete the next milestone
    Complete {
        id: String,
        /// Milestone name (e.g. "inspection complete")
        milestone: String,
        /// Completion date, defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Fail unless the stored version still matches
        #[arg(long)]
        expected_version: Option<u64>,
    },
    /// Move the transaction to a new status
    Advance {
        id: String,
        /// Target status
        status: String,
        #[arg(long)]
        expected_version: Option<u64>,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(ctx: &CliContext, cmd: TransactionCommands) -> DealResult<()> {
    let service =
        TransactionService::new(ctx.storage, ctx.settings, ctx.change_log).as_of(ctx.today);

    match cmd {
        TransactionCommands::Create {
            address,
            city,
            state,
            zip,
            price,
            client,
            contract,
            closing,
            property_type,
            transaction_type,
            commission,
            rate,
            listing_agent,
            buyer_agent,
            notes,
        } => {
            let property_type = PropertyType::parse(&property_type).ok_or_else(|| {
                DealError::Validation(format!("Unknown property type: '{}'", property_type))
            })?;
            let transaction_type = TransactionType::parse(&transaction_type).ok_or_else(|| {
                DealError::Validation(format!("Unknown transaction type: '{}'", transaction_type))
            })?;
            let commission = commission.as_deref().map(parse_money).transpose()?;

            let input = CreateTransactionInput {
                property: Property {
                    address,
                    city,
                    state,
                    zip,
                    price: parse_money(&price)?,
                    property_type,
                },
                client_ref: client,
                contract_date: parse_date(&contract)?,
                closing_date: parse_date(&closing)?,
                transaction_type,
                commission,
                commission_rate: rate,
                listing_agent_ref: listing_agent,
                buyer_agent_ref: buyer_agent,
                notes,
            };

            let txn = service.create(input)?;
            println!("Created transaction:");
            println!("  ID:         {}", txn.id);
            println!("  Property:   {}", txn.property.full_address());
            println!("  Closing:    {}", txn.closing_date);
            println!(
                "  Commission: {}",
                txn.commission.format_with_symbol(&ctx.settings.currency_symbol)
            );
            println!("  Progress:   {}%", txn.progress);
        }

        TransactionCommands::List {
            status,
            risk,
            closing_within,
            agent,
            all,
            limit,
        } => {
            let mut filter = TransactionFilter::new();
            if let Some(s) = status {
                filter = filter.status(parse_status(&s)?);
            }
            if let Some(r) = risk {
                let level = RiskLevel::parse(&r)
                    .ok_or_else(|| DealError::Validation(format!("Unknown risk level: '{}'", r)))?;
                filter = filter.risk_level(level);
            }
            if let Some(days) = closing_within {
                filter = filter.closing_within(days);
            }
            if let Some(agent) = agent {
                filter = filter.agent(agent);
            }
            if all {
                filter = filter.include_archived();
            }
            if let Some(limit) = limit {
                filter = filter.limit(limit);
            }

            let summaries = service.list_transactions(&filter)?;
            println!("{}", format_transaction_list(&summaries, &ctx.settings.date_format));
        }

        TransactionCommands::Show { id } => {
            let txn = service.get_transaction(&id)?;
            let risk = compute_risk_with(&txn, ctx.today, &ctx.settings.risk_policy);
            let documents = DocumentService::new(ctx.storage, ctx.change_log).list(&id)?;
            print!(
                "{}",
                format_transaction_details(
                    &txn,
                    &risk,
                    &documents,
                    ctx.today,
                    &ctx.settings.currency_symbol
                )
            );
        }

        TransactionCommands::Complete {
            id,
            milestone,
            date,
            expected_version,
        } => {
            let date = date.as_deref().map(parse_date).transpose()?;
            let txn = service.complete_milestone(&id, expected_version, &milestone, date)?;
            let next = txn
                .current_milestone()
                .map(|m| m.name.label())
                .unwrap_or("none, all milestones complete");
            println!(
                "Milestone completed on {}. Progress {}% (v{}). Next: {}",
                txn.property.address,
                txn.progress,
                txn.version,
                next
            );
        }

        TransactionCommands::Advance {
            id,
            status,
            expected_version,
        } => {
            let new_status = parse_status(&status)?;
            let txn = service.advance_status(&id, expected_version, new_status)?;
            println!(
                "{} is now {} (v{})",
                txn.property.address,
                txn.status,
                txn.version
            );
        }
    }

    Ok(())
}

fn parse_status(value: &str) -> DealResult<TransactionStatus> {
    TransactionStatus::parse(value)
        .ok_or_else(|| DealError::Validation(format!("Unknown status: '{}'", value)))
}
