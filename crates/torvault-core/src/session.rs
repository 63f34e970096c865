//! Caller-side restore session state machine
//!
//! ```text
//! Idle -> PlanRequested -> PlanReady | PlanError
//! PlanReady -> ExecuteRequested -> Executed | ExecuteError
//! any state except ExecuteRequested -> PlanRequested (new request, mode or exclusion change)
//! ```

use crate::errors::{RestoreError, Result};
use crate::model::RestoreMode;
use crate::plan::{ExcludeSet, PlanRequest, RestorePlan};
use crate::result::RestoreResult;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    PlanRequested,
    PlanReady,
    PlanError,
    ExecuteRequested,
    Executed,
    ExecuteError,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct RestoreSession {
    state: SessionState,
    request: Option<PlanRequest>,
    plan: Option<RestorePlan>,
    result: Option<RestoreResult>,
    last_error: Option<String>,
}

impl Default for RestoreSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RestoreSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            request: None,
            plan: None,
            result: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request(&self) -> Option<&PlanRequest> {
        self.request.as_ref()
    }

    pub fn plan(&self) -> Option<&RestorePlan> {
        self.plan.as_ref()
    }

    pub fn result(&self) -> Option<&RestoreResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn require(&self, allowed: &[SessionState], action: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(RestoreError::InvalidTransition {
                state: self.state.to_string(),
                action: action.to_string(),
            })
        }
    }

    /// # Errors
    ///
    /// `InvalidTransition` while an execution is in flight.
    pub fn request_plan(&mut self, request: PlanRequest) -> Result<()> {
        if self.state == SessionState::ExecuteRequested {
            return Err(RestoreError::InvalidTransition {
                state: self.state.to_string(),
                action: "request_plan".to_string(),
            });
        }
        self.request = Some(request);
        self.plan = None;
        self.result = None;
        self.last_error = None;
        self.state = SessionState::PlanRequested;
        Ok(())
    }

    /// Re-request the current plan under a different mode
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if no plan was ever requested or an execution is
    /// in flight.
    pub fn change_mode(&mut self, mode: RestoreMode) -> Result<()> {
        let request = self.current_request("change_mode")?.with_mode(mode);
        self.request_plan(request)
    }

    /// Re-request the current plan with a different exclusion set
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if no plan was ever requested or an execution is
    /// in flight.
    pub fn change_exclusions(&mut self, exclude: ExcludeSet) -> Result<()> {
        let request = self.current_request("change_exclusions")?.with_exclude(exclude);
        self.request_plan(request)
    }

    fn current_request(&self, action: &str) -> Result<PlanRequest> {
        self.request
            .clone()
            .ok_or_else(|| RestoreError::InvalidTransition {
                state: self.state.to_string(),
                action: action.to_string(),
            })
    }

    /// # Errors
    ///
    /// `InvalidTransition` unless a plan is pending.
    pub fn plan_ready(&mut self, plan: RestorePlan) -> Result<()> {
        self.require(&[SessionState::PlanRequested], "plan_ready")?;
        self.plan = Some(plan);
        self.state = SessionState::PlanReady;
        Ok(())
    }

    /// # Errors
    ///
    /// `InvalidTransition` unless a plan is pending.
    pub fn plan_failed(&mut self, message: impl Into<String>) -> Result<()> {
        self.require(&[SessionState::PlanRequested], "plan_failed")?;
        self.last_error = Some(message.into());
        self.state = SessionState::PlanError;
        Ok(())
    }

    /// Move to `ExecuteRequested` and hand back the request to execute
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless a plan is ready.
    pub fn request_execute(&mut self) -> Result<PlanRequest> {
        self.require(&[SessionState::PlanReady], "request_execute")?;
        let request = self.current_request("request_execute")?;
        self.state = SessionState::ExecuteRequested;
        Ok(request)
    }

    /// # Errors
    ///
    /// `InvalidTransition` unless an execution is in flight.
    pub fn executed(&mut self, result: RestoreResult) -> Result<()> {
        self.require(&[SessionState::ExecuteRequested], "executed")?;
        self.result = Some(result);
        self.state = SessionState::Executed;
        Ok(())
    }

    /// # Errors
    ///
    /// `InvalidTransition` unless an execution is in flight.
    pub fn execute_failed(&mut self, message: impl Into<String>) -> Result<()> {
        self.require(&[SessionState::ExecuteRequested], "execute_failed")?;
        self.last_error = Some(message.into());
        self.state = SessionState::ExecuteError;
        Ok(())
    }
}
