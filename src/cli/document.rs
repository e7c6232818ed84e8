//! Document CLI commands

use clap::Subcommand;

use crate::display::format_document_list;
use crate::error::{DealError, DealResult};
use crate::models::{DocumentStatus, DocumentType};
use crate::services::DocumentService;

use super::{parse_date, CliContext};

/// Document subcommands
#[derive(Subcommand)]
pub enum DocumentCommands {
    /// Attach a document to a transaction
    Add {
        /// Transaction ID
        transaction: String,
        /// Document name (e.g. "Inspection Report")
        name: String,
        /// Document type (contract, report, financial, disclosure, title)
        #[arg(short = 't', long = "type")]
        doc_type: String,
        /// Document date, defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Initial status (pending, in-review, complete, signed, approved, clear)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// List documents for a transaction
    List {
        /// Transaction ID
        transaction: String,
    },
    /// Change a document's status
    Status {
        /// Document ID (full UUID or doc-xxxxxxxx)
        document: String,
        status: String,
    },
}

pub fn handle_document_command(ctx: &CliContext, cmd: DocumentCommands) -> DealResult<()> {
    let service = DocumentService::new(ctx.storage, ctx.change_log).as_of(ctx.today);

    match cmd {
        DocumentCommands::Add {
            transaction,
            name,
            doc_type,
            date,
            status,
        } => {
            let doc_type = DocumentType::parse(&doc_type).ok_or_else(|| {
                DealError::Validation(format!("Unknown document type: '{}'", doc_type))
            })?;
            let date = date.as_deref().map(parse_date).transpose()?;
            let status = status.as_deref().map(parse_doc_status).transpose()?;

            let doc = service.add(&transaction, &name, doc_type, date, status)?;
            println!("Added document {} ({}, {})", doc.id, doc.name, doc.status);
        }

        DocumentCommands::List { transaction } => {
            let documents = service.list(&transaction)?;
            println!("{}", format_document_list(&documents));
        }

        DocumentCommands::Status { document, status } => {
            let doc = service.set_status(&document, parse_doc_status(&status)?)?;
            println!("{} is now {}", doc.name, doc.status);
        }
    }

    Ok(())
}

fn parse_doc_status(value: &str) -> DealResult<DocumentStatus> {
    DocumentStatus::parse(value)
        .ok_or_else(|| DealError::Validation(format!("Unknown document status: '{}'", value)))
}
