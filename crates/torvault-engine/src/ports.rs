//! Contracts the engine consumes: a snapshot store and a live client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use torvault_core::errors::{ExError, ExErrorKind};
use torvault_core::model::CategorySnapshot;
use torvault_core::{BehaviorFlags, Change, LiveTorrent, ManifestItem, TorrentField};

/// Retrieves immutable manifests by backup run id
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// # Errors
    ///
    /// `NotFound` when no manifest is recorded for `run_id`; any other
    /// kind for store failures.
    async fn get_manifest(&self, run_id: &str) -> Result<torvault_core::BackupManifest, ExError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientErrorKind {
    /// The client could not be reached
    Unavailable,
    /// The client refused the request
    Rejected,
    NotFound,
    /// The object already exists
    Conflict,
    Other,
}

/// Typed failure returned by a client adapter
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Unavailable, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Rejected, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Conflict, message)
    }
}

impl From<ClientError> for ExError {
    fn from(err: ClientError) -> Self {
        let kind = match err.kind {
            ClientErrorKind::Unavailable => ExErrorKind::Io,
            ClientErrorKind::Rejected => ExErrorKind::InvalidInput,
            ClientErrorKind::NotFound => ExErrorKind::NotFound,
            ClientErrorKind::Conflict => ExErrorKind::ConstraintViolation,
            ClientErrorKind::Other => ExErrorKind::Internal,
        };
        ExError::new(kind).with_message(err.message)
    }
}

/// Failure of one time-bounded adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallFailure {
    Client(ClientError),
    TimedOut(Duration),
}

impl CallFailure {
    /// Stable code recorded against a failed operation
    pub(crate) fn code(&self) -> &'static str {
        match self {
            CallFailure::Client(_) => ExErrorKind::OperationFailed.code(),
            CallFailure::TimedOut(_) => ExErrorKind::Timeout.code(),
        }
    }

    pub(crate) fn message(&self) -> String {
        match self {
            CallFailure::Client(err) => err.to_string(),
            CallFailure::TimedOut(limit) => format!("timed out after {} ms", limit.as_millis()),
        }
    }
}

impl From<CallFailure> for ExError {
    fn from(failure: CallFailure) -> Self {
        match failure {
            CallFailure::Client(err) => err.into(),
            timed_out @ CallFailure::TimedOut(_) => {
                ExError::new(ExErrorKind::Timeout).with_message(timed_out.message())
            }
        }
    }
}

/// Run one adapter call under `limit`
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, CallFailure>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(CallFailure::Client),
        Err(_) => Err(CallFailure::TimedOut(limit)),
    }
}

/// What the client did with an `update_torrent` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentUpdateReport {
    /// Fields that were sent but left unchanged by the client
    pub unresolved: Vec<TorrentField>,
}

/// Reads and mutates one managed client instance
///
/// Adapters own any retry policy; the engine calls each method once.
#[async_trait]
pub trait ClientAdapter: Send + Sync {
    /// Identifier of the managed instance, used for execution locking
    fn instance_id(&self) -> &str;

    async fn list_categories(&self) -> Result<BTreeMap<String, CategorySnapshot>, ClientError>;
    async fn list_tags(&self) -> Result<Vec<String>, ClientError>;
    async fn list_torrents(&self) -> Result<Vec<LiveTorrent>, ClientError>;

    async fn create_category(&self, name: &str, save_path: &str) -> Result<(), ClientError>;
    async fn update_category(&self, name: &str, save_path: &str) -> Result<(), ClientError>;
    async fn delete_category(&self, name: &str) -> Result<(), ClientError>;

    async fn create_tag(&self, name: &str) -> Result<(), ClientError>;
    async fn delete_tag(&self, name: &str) -> Result<(), ClientError>;

    /// Add a torrent from its backed-up `.torrent` payload
    async fn add_torrent(&self, item: &ManifestItem, flags: BehaviorFlags) -> Result<(), ClientError>;
    /// Apply supported changes; the desired value of each change is the target
    async fn update_torrent(
        &self,
        hash: &str,
        changes: &[Change],
    ) -> Result<TorrentUpdateReport, ClientError>;
    async fn delete_torrent(&self, hash: &str) -> Result<(), ClientError>;
}
