//! Plan execution
//!
//! ## Order
//! 1. category creates, then category updates
//! 2. tag creates
//! 3. torrent adds, then torrent updates
//! 4. torrent deletes
//! 5. tag deletes
//! 6. category deletes
//!
//! A torrent never references a category or tag before it exists, and
//! nothing is deleted while a dependent could still need it.
//!
//! ## Failure model
//! Every operation is attempted independently. A failed or timed-out call
//! is recorded in `errors` and execution moves on; nothing is rolled back.
//! Cancellation is checked between operations only.

use crate::ports::{bounded, ClientAdapter, ClientError, TorrentUpdateReport};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use torvault_core::diff::{CategoryCreate, CategoryUpdate, TorrentUpdate};
use torvault_core::errors::ExErrorKind;
use torvault_core::{
    AppliedCounts, BehaviorFlags, Change, ManifestItem, OperationError, OperationKind,
    RestorePlan, RestoreResult,
};
use tracing::{debug, error, warn};

pub const MISSING_PAYLOAD_MESSAGE: &str = "torrent file missing from backup";

/// Per-call knobs for [`execute_plan`]
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Record what would be applied without calling any mutator
    pub dry_run: bool,
    /// Passed to `add_torrent` after normalization
    pub flags: BehaviorFlags,
    /// Bound on each adapter call
    pub op_timeout: Duration,
    pub cancel: CancellationToken,
}

impl ExecuteOptions {
    pub fn new(dry_run: bool, flags: BehaviorFlags) -> Self {
        Self {
            dry_run,
            flags,
            op_timeout: Duration::from_millis(crate::settings::DEFAULT_OP_TIMEOUT_MS),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// One mutation, borrowed from the plan
#[derive(Debug, Clone, Copy)]
enum Step<'a> {
    CreateCategory(&'a CategoryCreate),
    UpdateCategory(&'a CategoryUpdate),
    CreateTag(&'a str),
    AddTorrent(&'a ManifestItem),
    UpdateTorrent(&'a TorrentUpdate),
    DeleteTorrent(&'a str),
    DeleteTag(&'a str),
    DeleteCategory(&'a str),
}

impl Step<'_> {
    fn kind(&self) -> OperationKind {
        match self {
            Step::CreateCategory(_) => OperationKind::CreateCategory,
            Step::UpdateCategory(_) => OperationKind::UpdateCategory,
            Step::CreateTag(_) => OperationKind::CreateTag,
            Step::AddTorrent(_) => OperationKind::AddTorrent,
            Step::UpdateTorrent(_) => OperationKind::UpdateTorrent,
            Step::DeleteTorrent(_) => OperationKind::DeleteTorrent,
            Step::DeleteTag(_) => OperationKind::DeleteTag,
            Step::DeleteCategory(_) => OperationKind::DeleteCategory,
        }
    }

    fn target(&self) -> &str {
        match self {
            Step::CreateCategory(create) => &create.name,
            Step::UpdateCategory(update) => &update.name,
            Step::AddTorrent(item) => &item.hash,
            Step::UpdateTorrent(update) => &update.hash,
            Step::CreateTag(name)
            | Step::DeleteTorrent(name)
            | Step::DeleteTag(name)
            | Step::DeleteCategory(name) => name,
        }
    }
}

fn ordered_steps(plan: &RestorePlan) -> Vec<Step<'_>> {
    let categories = &plan.categories;
    let tags = &plan.tags;
    let torrents = &plan.torrents;

    categories
        .create
        .iter()
        .map(Step::CreateCategory)
        .chain(categories.update.iter().map(Step::UpdateCategory))
        .chain(tags.create.iter().map(|t| Step::CreateTag(&t.name)))
        .chain(torrents.add.iter().map(|a| Step::AddTorrent(&a.manifest)))
        .chain(torrents.update.iter().map(Step::UpdateTorrent))
        .chain(torrents.delete.iter().map(|h| Step::DeleteTorrent(h)))
        .chain(tags.delete.iter().map(|t| Step::DeleteTag(t)))
        .chain(categories.delete.iter().map(|c| Step::DeleteCategory(c)))
        .collect()
}

/// Outcome bookkeeping for one execute call
struct Run<'a> {
    client: &'a dyn ClientAdapter,
    options: &'a ExecuteOptions,
    flags: BehaviorFlags,
    run_id: &'a str,
    applied: AppliedCounts,
    warnings: Vec<String>,
    errors: Vec<OperationError>,
}

impl Run<'_> {
    fn warn(&mut self, step: &Step<'_>, message: String) {
        warn!(
            run_id = self.run_id,
            instance = self.client.instance_id(),
            operation = step.kind().as_str(),
            target = step.target(),
            "{}",
            message
        );
        self.warnings.push(message);
    }

    fn fail(&mut self, step: &Step<'_>, message: String, code: &str) {
        error!(
            run_id = self.run_id,
            instance = self.client.instance_id(),
            operation = step.kind().as_str(),
            target = step.target(),
            err.code = code,
            "{}",
            message
        );
        self.errors.push(OperationError {
            operation: step.kind(),
            target: step.target().to_string(),
            message,
            code: code.to_string(),
        });
    }

    fn record_applied(&mut self, step: &Step<'_>) {
        debug!(
            run_id = self.run_id,
            instance = self.client.instance_id(),
            operation = step.kind().as_str(),
            target = step.target(),
            dry_run = self.options.dry_run,
            "applied"
        );
        self.applied.record(step.kind());
    }

    /// Checks that need no client call; `false` means the step is done
    fn precheck(&mut self, step: &Step<'_>) -> bool {
        match step {
            Step::AddTorrent(item) if !item.has_payload() => {
                let message = format!("{}: {}", item.hash, MISSING_PAYLOAD_MESSAGE);
                if self.options.dry_run {
                    self.warn(step, message);
                } else {
                    self.fail(step, message, ExErrorKind::OperationFailed.code());
                }
                false
            }
            Step::UpdateTorrent(update) => {
                for change in update.unsupported_changes() {
                    let message = format!(
                        "{}: {} cannot be changed in place: {}",
                        update.hash,
                        change.field,
                        change.message.as_deref().unwrap_or("manual action required")
                    );
                    self.warn(step, message);
                }
                update.supported_changes().next().is_some()
            }
            _ => true,
        }
    }

    async fn apply(&mut self, step: Step<'_>) {
        if !self.precheck(&step) {
            return;
        }
        if self.options.dry_run {
            self.record_applied(&step);
            return;
        }

        match bounded(self.options.op_timeout, dispatch(self.client, step, self.flags)).await {
            Ok(report) => {
                self.record_applied(&step);
                for field in report.unresolved {
                    let message = format!("{}: client left {} unchanged", step.target(), field);
                    self.warn(&step, message);
                }
            }
            Err(failure) => {
                let message = format!("{} {}: {}", step.kind(), step.target(), failure.message());
                self.fail(&step, message, failure.code());
            }
        }
    }
}

async fn dispatch(
    client: &dyn ClientAdapter,
    step: Step<'_>,
    flags: BehaviorFlags,
) -> Result<TorrentUpdateReport, ClientError> {
    let done = |()| TorrentUpdateReport::default();
    match step {
        Step::CreateCategory(create) => client
            .create_category(&create.name, &create.save_path)
            .await
            .map(done),
        Step::UpdateCategory(update) => client
            .update_category(&update.name, &update.desired_path)
            .await
            .map(done),
        Step::CreateTag(name) => client.create_tag(name).await.map(done),
        Step::AddTorrent(item) => client.add_torrent(item, flags).await.map(done),
        Step::UpdateTorrent(update) => {
            let changes: Vec<Change> = update.supported_changes().cloned().collect();
            client.update_torrent(&update.hash, &changes).await
        }
        Step::DeleteTorrent(hash) => client.delete_torrent(hash).await.map(done),
        Step::DeleteTag(name) => client.delete_tag(name).await.map(done),
        Step::DeleteCategory(name) => client.delete_category(name).await.map(done),
    }
}

/// Apply `plan` to the client in dependency order
///
/// Never fails as a whole: per-operation failures land in
/// [`RestoreResult::errors`]. The plan is applied as given; live state is
/// not re-read.
pub async fn execute_plan(
    plan: RestorePlan,
    client: &dyn ClientAdapter,
    options: &ExecuteOptions,
) -> RestoreResult {
    let flags = options.flags.normalized();
    if flags != options.flags {
        debug!(
            run_id = %plan.run_id,
            "auto_resume disabled because skip_checking is off"
        );
    }

    let mut cancelled = false;
    let (applied, warnings, errors) = {
        let mut run = Run {
            client,
            options,
            flags,
            run_id: &plan.run_id,
            applied: AppliedCounts::default(),
            warnings: Vec::new(),
            errors: Vec::new(),
        };

        let steps = ordered_steps(&plan);
        let total = steps.len();
        for (index, step) in steps.into_iter().enumerate() {
            if options.cancel.is_cancelled() {
                cancelled = true;
                let message = format!(
                    "execution cancelled; {} of {} operations not attempted",
                    total - index,
                    total
                );
                warn!(run_id = run.run_id, instance = client.instance_id(), "{}", message);
                run.warnings.push(message);
                break;
            }
            run.apply(step).await;
        }

        (run.applied, run.warnings, run.errors)
    };

    RestoreResult {
        dry_run: options.dry_run,
        mode: plan.mode,
        plan,
        applied,
        warnings,
        errors,
        cancelled,
        plan_reused: false,
    }
}
