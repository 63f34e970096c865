//! Backup run commands: import a manifest, list and show recorded runs

use super::{print_json, Global};
use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use torvault_core::{log_op_end, log_op_start, BackupManifest};
use torvault_store::runs::{fetch_run_row, list_runs, load_manifest};

#[derive(Debug, Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupCommand,
}

#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Record a manifest JSON file as a new backup run
    Import(ImportArgs),
    /// List recorded runs
    List(ListArgs),
    /// Show one recorded run
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Manifest JSON file
    #[arg(long)]
    pub manifest: PathBuf,

    /// Client instance the backup was taken from
    #[arg(long)]
    pub instance: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub instance: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub run: String,
}

#[derive(Debug, Serialize)]
struct ImportOutput<'a> {
    run_id: &'a str,
    manifest_digest: &'a str,
    payloads: usize,
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    run: &'a torvault_store::BackupRunRow,
    payloads: usize,
}

pub fn execute(args: BackupArgs, global: &Global) -> anyhow::Result<()> {
    match args.command {
        BackupCommand::Import(import_args) => execute_import(import_args, global),
        BackupCommand::List(list_args) => execute_list(list_args, global),
        BackupCommand::Show(show_args) => execute_show(show_args, global),
    }
}

fn execute_import(args: ImportArgs, global: &Global) -> anyhow::Result<()> {
    let start = Instant::now();
    log_op_start!("backup_import", instance = %args.instance);

    let bytes = std::fs::read(&args.manifest)
        .with_context(|| format!("reading {}", args.manifest.display()))?;
    let manifest = BackupManifest::from_json_slice(&bytes)
        .with_context(|| format!("parsing {}", args.manifest.display()))?;

    let (mut conn, cas) = global.open_ledger()?;
    let record = torvault_store::record_run(&mut conn, &cas, &args.instance, &manifest)?;

    log_op_end!(
        "backup_import",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = %record.run_id
    );

    if global.json {
        return print_json(&ImportOutput {
            run_id: &record.run_id,
            manifest_digest: &record.manifest_digest,
            payloads: record.payloads.len(),
        });
    }
    println!("Backup recorded:");
    println!("  run_id: {}", record.run_id);
    println!("  manifest_digest: {}", record.manifest_digest);
    println!("  torrents: {}", manifest.items.len());
    println!("  payloads: {}", record.payloads.len());
    Ok(())
}

fn execute_list(args: ListArgs, global: &Global) -> anyhow::Result<()> {
    let (conn, _cas) = global.open_ledger()?;
    let runs = list_runs(&conn, args.instance.as_deref())?;

    if global.json {
        return print_json(&runs);
    }
    if runs.is_empty() {
        println!("No backup runs recorded.");
        return Ok(());
    }
    println!("| Run | Instance | Captured | Torrents | Size (bytes) |");
    println!("|---|---|---|---|---|");
    for run in &runs {
        println!(
            "| {} | {} | {} | {} | {} |",
            run.run_id, run.instance_id, run.generated_at, run.torrent_count, run.total_size_bytes
        );
    }
    Ok(())
}

fn execute_show(args: ShowArgs, global: &Global) -> anyhow::Result<()> {
    let (conn, cas) = global.open_ledger()?;
    let run = fetch_run_row(&conn, &args.run)?;
    let manifest = load_manifest(&conn, &cas, &args.run)?;
    let payloads = manifest.items.iter().filter(|i| i.has_payload()).count();

    if global.json {
        return print_json(&ShowOutput {
            run: &run,
            payloads,
        });
    }
    println!("Backup run {}:", run.run_id);
    println!("  instance: {}", run.instance_id);
    println!("  captured: {}", run.generated_at);
    println!("  manifest_digest: {}", run.manifest_digest);
    println!("  categories: {}", run.category_count);
    println!("  tags: {}", run.tag_count);
    println!("  torrents: {} ({} with .torrent payload)", run.torrent_count, payloads);
    println!("  total_size_bytes: {}", run.total_size_bytes);
    Ok(())
}
