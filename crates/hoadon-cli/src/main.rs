//! CLI application for invoice extraction, reconciliation and review.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{analyze, batch, config, records, save};

/// hoadon - Extract, reconcile and record invoice amounts
#[derive(Parser)]
#[command(name = "hoadon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and reconcile a single invoice
    Analyze(analyze::AnalyzeArgs),

    /// Analyze many invoices at once
    Batch(batch::BatchArgs),

    /// Review an invoice and save it to the store
    Save(save::SaveArgs),

    /// List saved invoices
    List(records::ListArgs),

    /// Approve a pending edit request
    Approve(records::IdArgs),

    /// Reject a pending edit request
    Reject(records::IdArgs),

    /// Mark a saved invoice as deleted
    Delete(records::IdArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries command output (JSON, CSV)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Analyze(args) => analyze::run(args, config_path),
        Commands::Batch(args) => batch::run(args, config_path),
        Commands::Save(args) => save::run(args, config_path),
        Commands::List(args) => records::list(args, config_path),
        Commands::Approve(args) => records::approve(args, config_path),
        Commands::Reject(args) => records::reject(args, config_path),
        Commands::Delete(args) => records::delete(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
