//! `invmatch`: reads supplier invoices, finds their purchase-order rows in
//! the ledger sheets and fills in the invoice columns.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{batch, config, process};

/// Match supplier invoices to purchase-order ledger rows
#[derive(Parser)]
#[command(name = "invmatch", author, version, about, long_about = None)]
struct Cli {
    /// Log more detail (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the fields extracted from one invoice
    Process(process::ProcessArgs),

    /// Match invoices against ledger sheets and write back the results
    Batch(batch::BatchArgs),

    /// Show or edit thresholds, routes and other settings
    Config(config::ConfigArgs),
}

fn log_filter(verbose: u8) -> EnvFilter {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path),
        Commands::Batch(args) => batch::run(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
