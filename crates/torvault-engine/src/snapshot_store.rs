//! Snapshot store implementations

#![allow(clippy::result_large_err)]

use crate::ports::SnapshotStore;
use async_trait::async_trait;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use torvault_core::errors::{ExError, ExErrorKind};
use torvault_core::BackupManifest;
use torvault_store::cas::FsStore;

/// Snapshot store over the SQLite ledger and CAS
///
/// SQLite calls run on the blocking pool.
#[derive(Clone)]
pub struct LedgerSnapshotStore {
    conn: Arc<Mutex<Connection>>,
    cas: FsStore,
}

impl LedgerSnapshotStore {
    pub fn new(conn: Connection, cas: FsStore) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            cas,
        }
    }
}

#[async_trait]
impl SnapshotStore for LedgerSnapshotStore {
    async fn get_manifest(&self, run_id: &str) -> Result<BackupManifest, ExError> {
        let conn = Arc::clone(&self.conn);
        let cas = self.cas.clone();
        let run_id = run_id.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| {
                ExError::new(ExErrorKind::Concurrency)
                    .with_op("get_manifest")
                    .with_message("ledger connection lock poisoned")
            })?;
            torvault_store::runs::load_manifest(&conn, &cas, &run_id)
        })
        .await
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("get_manifest")
                .with_message(format!("ledger task failed: {}", e))
        })?
    }
}

/// In-memory snapshot store keyed by run id
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    manifests: Mutex<BTreeMap<String, BackupManifest>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(self, run_id: impl Into<String>, manifest: BackupManifest) -> Self {
        self.insert(run_id, manifest);
        self
    }

    pub fn insert(&self, run_id: impl Into<String>, manifest: BackupManifest) {
        let mut manifests = self
            .manifests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        manifests.insert(run_id.into(), manifest);
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get_manifest(&self, run_id: &str) -> Result<BackupManifest, ExError> {
        let manifests = self
            .manifests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        manifests.get(run_id).cloned().ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("get_manifest")
                .with_entity_id(run_id)
                .with_message("backup run not found")
        })
    }
}
