//! Restore commands: plan and execute against a client state file
//!
//! The client is an in-memory instance loaded from `--state` (JSON). After a
//! real execute the resulting state is written back to the same file.

use super::{print_json, Global};
use anyhow::anyhow;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use torvault_core::summary::{render_plan_summary, render_result_summary};
use torvault_core::{ApiVersion, BehaviorFlags, ExcludeSet, PlanRequest, RestoreMode, RestorePlan};
use torvault_engine::{InMemoryClient, LedgerSnapshotStore, RestoreService};

#[derive(Debug, Args)]
pub struct RestoreArgs {
    #[command(subcommand)]
    pub command: RestoreCommand,
}

#[derive(Debug, Subcommand)]
pub enum RestoreCommand {
    /// Show what a restore would change
    Plan(PlanArgs),
    /// Apply a restore (or dry-run it)
    Execute(ExecuteArgs),
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Backup run to restore from
    #[arg(long)]
    pub run: String,

    /// Client state file (JSON); a missing file is an empty client
    #[arg(long)]
    pub state: PathBuf,

    #[arg(long, default_value = "default")]
    pub instance: String,

    /// incremental | overwrite | complete (defaults to the settings file)
    #[arg(long)]
    pub mode: Option<RestoreMode>,

    /// Torrent hash to leave out; repeatable
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Client Web API version, e.g. 2.8.4 (defaults to the settings file)
    #[arg(long)]
    pub api_version: Option<ApiVersion>,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Args)]
pub struct ExecuteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long)]
    pub dry_run: bool,

    /// Add torrents paused; `--start-paused=false` overrides the settings file
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub start_paused: Option<bool>,

    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub skip_checking: Option<bool>,

    /// Only honored together with --skip-checking
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub auto_resume: Option<bool>,
}

impl ExecuteArgs {
    /// Flags given on the command line win over `defaults`
    fn behavior_flags(&self, defaults: BehaviorFlags) -> BehaviorFlags {
        BehaviorFlags {
            start_paused: self.start_paused.unwrap_or(defaults.start_paused),
            skip_checking: self.skip_checking.unwrap_or(defaults.skip_checking),
            auto_resume: self.auto_resume.unwrap_or(defaults.auto_resume),
        }
    }
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    digest: String,
    plan: &'a RestorePlan,
}

pub async fn execute(args: RestoreArgs, global: &Global) -> anyhow::Result<()> {
    match args.command {
        RestoreCommand::Plan(plan_args) => execute_plan(plan_args, global).await,
        RestoreCommand::Execute(execute_args) => execute_restore(execute_args, global).await,
    }
}

fn request(target: &TargetArgs, global: &Global) -> PlanRequest {
    let mode = target.mode.unwrap_or(global.settings.default_mode);
    PlanRequest::new(target.run.clone(), mode)
        .with_exclude(target.exclude.iter().cloned().collect::<ExcludeSet>())
}

fn service(
    target: &TargetArgs,
    global: &Global,
) -> anyhow::Result<(RestoreService, Arc<InMemoryClient>)> {
    let (conn, cas) = global.open_ledger()?;
    let client = Arc::new(InMemoryClient::load_json(
        target.instance.clone(),
        &target.state,
    )?);
    let mut settings = global.settings.clone();
    if target.api_version.is_some() {
        settings.api_version = target.api_version;
    }
    let service = RestoreService::new(
        Arc::new(LedgerSnapshotStore::new(conn, cas)),
        client.clone(),
        settings.capability_gate(),
        settings,
    );
    Ok((service, client))
}

async fn execute_plan(args: PlanArgs, global: &Global) -> anyhow::Result<()> {
    let (service, _client) = service(&args.target, global)?;
    let plan = service.build_plan(&request(&args.target, global)).await?;
    let digest = plan.digest()?;

    if global.json {
        return print_json(&PlanOutput {
            digest,
            plan: &plan,
        });
    }
    print!("{}", render_plan_summary(&plan));
    println!();
    println!("Plan digest: {}", digest);
    Ok(())
}

async fn execute_restore(args: ExecuteArgs, global: &Global) -> anyhow::Result<()> {
    let flags = args.behavior_flags(global.settings.behavior);

    let (service, client) = service(&args.target, global)?;
    let result = service
        .execute(&request(&args.target, global), args.dry_run, flags)
        .await?;

    if !args.dry_run {
        client.save_json(&args.target.state)?;
    }

    if global.json {
        print_json(&result)?;
    } else {
        print!("{}", render_result_summary(&result));
    }

    if !result.errors.is_empty() {
        return Err(anyhow!(
            "{} of {} operations failed",
            result.errors.len(),
            result.errors.len() + result.applied.total()
        ));
    }
    Ok(())
}
