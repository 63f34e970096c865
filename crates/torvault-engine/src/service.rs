//! Restore service: the two externally callable entry points
//!
//! ## Plan cache
//! `build_plan` always recomputes and stores the plan under its request key,
//! replacing any earlier plan for the same run. `execute` applies a cached
//! plan for the identical key as-is (it may be stale; last write wins) or
//! computes a fresh one. A real execute consumes the cache since live state
//! has moved on; a dry run leaves it in place.
//!
//! ## Locking
//! `execute` holds the instance lock for its whole duration, dry runs
//! included. `build_plan` never takes it. The lock registry is shared by
//! every service in the process unless [`RestoreService::with_locks`] gives
//! one its own. A cancel that arrives while waiting for the lock fails the
//! call with `Cancelled`.

#![allow(clippy::result_large_err)]

use crate::executor::{execute_plan, ExecuteOptions};
use crate::locks::InstanceLocks;
use crate::planner;
use crate::ports::{ClientAdapter, SnapshotStore};
use crate::settings::RestoreSettings;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use torvault_core::errors::{ExError, ExErrorKind};
use torvault_core::torvault_core_types::RequestContext;
use torvault_core::{
    log_op_end, log_op_error, log_op_start, BehaviorFlags, CapabilityGate, PlanRequest,
    RestorePlan, RestoreResult,
};

pub struct RestoreService {
    store: Arc<dyn SnapshotStore>,
    client: Arc<dyn ClientAdapter>,
    gate: Arc<dyn CapabilityGate>,
    settings: RestoreSettings,
    locks: InstanceLocks,
    cache: Mutex<HashMap<PlanRequest, RestorePlan>>,
}

impl RestoreService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        client: Arc<dyn ClientAdapter>,
        gate: Arc<dyn CapabilityGate>,
        settings: RestoreSettings,
    ) -> Self {
        Self {
            store,
            client,
            gate,
            settings,
            locks: InstanceLocks::global(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Use `locks` instead of the process-wide registry
    pub fn with_locks(mut self, locks: InstanceLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn settings(&self) -> &RestoreSettings {
        &self.settings
    }

    pub fn instance_id(&self) -> &str {
        self.client.instance_id()
    }

    /// The plan currently cached for `request`, if any
    pub fn cached_plan(&self, request: &PlanRequest) -> Option<RestorePlan> {
        self.cache().get(request).cloned()
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<PlanRequest, RestorePlan>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remember(&self, request: &PlanRequest, plan: &RestorePlan) {
        if self.settings.cache_plans {
            let mut cache = self.cache();
            cache.retain(|key, _| key.run_id != request.run_id);
            cache.insert(request.clone(), plan.clone());
        }
    }

    async fn fresh_plan(&self, request: &PlanRequest) -> Result<RestorePlan, ExError> {
        planner::build_plan(
            request,
            self.store.as_ref(),
            self.client.as_ref(),
            self.gate.as_ref(),
            self.settings.op_timeout(),
        )
        .await
    }

    /// Compute the plan for `request` against current live state
    ///
    /// # Errors
    ///
    /// `SnapshotNotFound`, `LiveStateUnavailable` or `InvalidManifest`.
    pub async fn build_plan(&self, request: &PlanRequest) -> Result<RestorePlan, ExError> {
        let ctx = RequestContext::new();
        let start = Instant::now();
        log_op_start!(
            "build_plan",
            request_id = %ctx.request_id,
            run_id = %request.run_id,
            instance = self.instance_id(),
            mode = request.mode.as_str(),
            excluded = request.exclude.len()
        );

        match self.fresh_plan(request).await {
            Ok(plan) => {
                self.remember(request, &plan);
                log_op_end!(
                    "build_plan",
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = %ctx.request_id,
                    plan_ops = plan.counts().total()
                );
                Ok(plan)
            }
            Err(err) => {
                let err = err.with_request_id(ctx.request_id.clone());
                log_op_error!(
                    "build_plan",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = %ctx.request_id
                );
                Err(err)
            }
        }
    }

    /// Execute (or dry-run) the plan for `request`
    ///
    /// # Errors
    ///
    /// Only planning failures; per-operation failures are reported in the
    /// returned [`RestoreResult`].
    pub async fn execute(
        &self,
        request: &PlanRequest,
        dry_run: bool,
        flags: BehaviorFlags,
    ) -> Result<RestoreResult, ExError> {
        self.execute_with_cancel(request, dry_run, flags, CancellationToken::new())
            .await
    }

    /// [`execute`](Self::execute) with a caller-held cancellation token
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), or `Cancelled` when `cancel` fires
    /// before the instance lock is free.
    pub async fn execute_with_cancel(
        &self,
        request: &PlanRequest,
        dry_run: bool,
        flags: BehaviorFlags,
        cancel: CancellationToken,
    ) -> Result<RestoreResult, ExError> {
        let ctx = RequestContext::new();
        let start = Instant::now();
        log_op_start!(
            "execute",
            request_id = %ctx.request_id,
            run_id = %request.run_id,
            instance = self.instance_id(),
            mode = request.mode.as_str(),
            dry_run = dry_run
        );

        let _guard = tokio::select! {
            biased;
            guard = self.locks.acquire(self.instance_id()) => guard,
            _ = cancel.cancelled() => {
                let err = ExError::new(ExErrorKind::Cancelled)
                    .with_op("execute")
                    .with_entity_id(self.instance_id())
                    .with_message("cancelled while waiting for the instance lock")
                    .with_request_id(ctx.request_id.clone());
                log_op_error!(
                    "execute",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = %ctx.request_id
                );
                return Err(err);
            }
        };

        let cached = if dry_run {
            self.cached_plan(request)
        } else {
            self.cache().remove(request)
        };
        let plan_reused = cached.is_some();
        let plan = match cached {
            Some(plan) => plan,
            None => match self.fresh_plan(request).await {
                Ok(plan) => {
                    if dry_run {
                        self.remember(request, &plan);
                    }
                    plan
                }
                Err(err) => {
                    let err = err.with_request_id(ctx.request_id.clone());
                    log_op_error!(
                        "execute",
                        err.clone(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        request_id = %ctx.request_id
                    );
                    return Err(err);
                }
            },
        };

        let options = ExecuteOptions::new(dry_run, flags)
            .with_timeout(self.settings.op_timeout())
            .with_cancel(cancel);
        let mut result = execute_plan(plan, self.client.as_ref(), &options).await;
        result.plan_reused = plan_reused;

        if !dry_run {
            self.cache().clear();
        }

        log_op_end!(
            "execute",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id,
            plan_reused = plan_reused,
            applied = result.applied.total(),
            warnings = result.warnings.len(),
            errors = result.errors.len(),
            cancelled = result.cancelled
        );
        Ok(result)
    }
}
