//! Torvault CLI
//!
//! Command-line interface for recording torrent-client backups and
//! restoring a client from them

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use torvault_core::logging_facility;
use torvault_engine::RestoreSettings;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "torvault")]
#[command(about = "Torvault - torrent client backup and restore", long_about = None)]
struct Cli {
    /// Backup ledger database
    #[arg(long, global = true, default_value = ".torvault/ledger.db")]
    db: PathBuf,

    /// Blob store directory
    #[arg(long, global = true, default_value = ".torvault/cas")]
    cas: PathBuf,

    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of Markdown
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Backup run operations
    Backup(commands::backup::BackupArgs),
    /// Plan or execute a restore
    Restore(commands::restore::RestoreArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match RestoreSettings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    logging_facility::init(settings.log_profile);

    let global = commands::Global {
        db: cli.db,
        cas: cli.cas,
        json: cli.json,
        settings,
    };

    let result = match cli.command {
        Commands::Backup(args) => commands::backup::execute(args, &global),
        Commands::Restore(args) => commands::restore::execute(args, &global).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
