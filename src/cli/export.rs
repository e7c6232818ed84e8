//! CLI commands for data export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::{DealError, DealResult};
use crate::export::{
    export_documents_csv, export_full_json, export_full_yaml, export_transactions_csv,
};

use super::CliContext;

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Full export as JSON
    Json {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Full export as YAML
    Yaml {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Transactions (or documents) as CSV
    Csv {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export documents instead of transactions
        #[arg(long)]
        documents: bool,
    },
}

pub fn handle_export_command(ctx: &CliContext, cmd: ExportCommands) -> DealResult<()> {
    match cmd {
        ExportCommands::Json { output, compact } => with_output(output.as_deref(), |w| {
            export_full_json(ctx.storage, w, !compact)?;
            writeln!(w).map_err(|e| DealError::Export(e.to_string()))
        }),
        ExportCommands::Yaml { output } => {
            with_output(output.as_deref(), |w| export_full_yaml(ctx.storage, w))
        }
        ExportCommands::Csv { output, documents } => with_output(output.as_deref(), |w| {
            if documents {
                export_documents_csv(ctx.storage, w)
            } else {
                export_transactions_csv(ctx.storage, ctx.today, &ctx.settings.risk_policy, w)
            }
        }),
    }
}

/// Run `write` against the output file, or stdout when none is given
fn with_output<F>(output: Option<&Path>, write: F) -> DealResult<()>
where
    F: FnOnce(&mut dyn Write) -> DealResult<()>,
{
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                DealError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer
                .flush()
                .map_err(|e| DealError::Export(e.to_string()))?;
            eprintln!("Exported to {}", path.display());
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)?;
            lock.flush().map_err(|e| DealError::Export(e.to_string()))
        }
    }
}
