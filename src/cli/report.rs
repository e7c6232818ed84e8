//! Report CLI commands

use clap::Subcommand;

use crate::display::{format_change_log, format_metrics, format_overdue, format_risk};
use crate::error::DealResult;
use crate::services::TransactionService;

use super::CliContext;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Portfolio metrics (active deals, closings this week, volume, success rate)
    Metrics {
        /// Trailing window in days for average days-to-close
        #[arg(short, long)]
        window: Option<u32>,
    },
    /// Incomplete milestones past their planned date
    Overdue,
    /// Risk score and contributing factors for one transaction
    Risk {
        /// Transaction ID
        id: String,
    },
    /// Recent entries from the change log
    Changes {
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
        /// Only changes to this transaction
        #[arg(short, long)]
        transaction: Option<String>,
    },
}

pub fn handle_report_command(ctx: &CliContext, cmd: ReportCommands) -> DealResult<()> {
    let service =
        TransactionService::new(ctx.storage, ctx.settings, ctx.change_log).as_of(ctx.today);

    match cmd {
        ReportCommands::Metrics { window } => {
            let window = window.unwrap_or(ctx.settings.metrics_window_days);
            let metrics = service.get_metrics(window)?;
            print!(
                "{}",
                format_metrics(&metrics, window, &ctx.settings.currency_symbol)
            );
        }
        ReportCommands::Overdue => {
            println!("{}", format_overdue(&service.overdue()?));
        }
        ReportCommands::Risk { id } => {
            let (txn, risk) = service.assess_risk(&id)?;
            print!("{}", format_risk(&txn, &risk));
        }
        ReportCommands::Changes { count, transaction } => {
            let transaction_id = match transaction {
                Some(t) => Some(service.get_transaction(&t)?.id.to_string()),
                None => None,
            };
            let events = ctx
                .change_log
                .read_recent(count, transaction_id.as_deref())?;
            println!("{}", format_change_log(&events));
        }
    }

    Ok(())
}
