use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealtrack::audit::ChangeLog;
use dealtrack::cli::{
    handle_document_command, handle_export_command, handle_report_command,
    handle_transaction_command, parse_date, CliContext,
};
use dealtrack::config::{paths::DealPaths, settings::Settings};
use dealtrack::storage::{self, Storage};

#[derive(Parser)]
#[command(
    name = "dealtrack",
    version,
    about = "Real-estate transaction tracker",
    long_about = "dealtrack follows each deal from signed contract to closing: \
                  milestones in order, progress, risk and portfolio metrics."
)]
struct Cli {
    /// Evaluate dates as of this day (YYYY-MM-DD) instead of today
    #[arg(long, global = true, env = "DEALTRACK_TODAY")]
    today: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default settings
    Init {
        /// Load three sample transactions into an empty store
        #[arg(long)]
        demo: bool,
    },

    /// Show configuration paths and settings
    Config,

    /// Transaction management commands
    #[command(subcommand, alias = "transaction")]
    Txn(dealtrack::cli::TransactionCommands),

    /// Document tracking commands
    #[command(subcommand, alias = "document")]
    Doc(dealtrack::cli::DocumentCommands),

    /// Portfolio, overdue and risk reports
    #[command(subcommand)]
    Report(dealtrack::cli::ReportCommands),

    /// Export data
    #[command(subcommand)]
    Export(dealtrack::cli::ExportCommands),
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dealtrack=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let today: NaiveDate = match cli.today.as_deref() {
        Some(s) => parse_date(s)?,
        None => Local::now().date_naive(),
    };

    let paths = DealPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let storage = Storage::new(paths.clone())?;
    storage
        .load_all()
        .with_context(|| format!("loading data from {}", paths.data_dir().display()))?;

    let change_log = ChangeLog::new(paths.change_log());
    let ctx = CliContext {
        storage: &storage,
        settings: &settings,
        change_log: &change_log,
        today,
    };

    match cli.command {
        Some(Commands::Init { demo }) => {
            println!("Initializing dealtrack at: {}", paths.base_dir().display());
            storage::initialize_storage(&paths)?;
            settings.save(&paths)?;
            if demo {
                let count = storage::seed_demo(&storage)?;
                println!("Loaded {} demo transactions.", count);
            }
            println!("Initialization complete!");
            println!();
            println!("Run 'dealtrack txn list' to see your transactions.");
        }
        Some(Commands::Config) => {
            println!("dealtrack Configuration");
            println!("=======================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Change log:      {}", change_log.path().display());
            println!(
                "Initialized:     {}",
                if paths.is_initialized() { "yes" } else { "no (run 'dealtrack init')" }
            );
            println!();
            println!("Settings:");
            println!("  Currency symbol:      {}", settings.currency_symbol);
            println!("  Date format:          {}", settings.date_format);
            println!(
                "  Default commission:   {:.2}%",
                settings.default_commission_rate * 100.0
            );
            println!("  Metrics window:       {} days", settings.metrics_window_days);
            let policy = &settings.risk_policy;
            println!(
                "  Risk levels:          low <= {}, medium <= {}, high above",
                policy.low_max, policy.medium_max
            );
        }
        Some(Commands::Txn(cmd)) => handle_transaction_command(&ctx, cmd)?,
        Some(Commands::Doc(cmd)) => handle_document_command(&ctx, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&ctx, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&ctx, cmd)?,
        None => {
            println!("dealtrack - real-estate transaction tracker");
            println!();
            println!("Run 'dealtrack --help' for usage information.");
            println!("Run 'dealtrack init --demo' to try it with sample deals.");
        }
    }

    Ok(())
}
