//! Recording backup runs.

#![allow(clippy::result_large_err)]

use crate::cas::{BlobKind, FsStore};
use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::collections::BTreeMap;
use torvault_core::errors::{ExError, ExErrorKind};
use torvault_core::BackupManifest;
use uuid::Uuid;

/// Outcome of [`record_run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    /// Unique run identifier (UUIDv7)
    pub run_id: String,
    /// Digest of the stored (payload-free) manifest JSON
    pub manifest_digest: String,
    /// Torrent hash -> payload blob digest
    pub payloads: BTreeMap<String, String>,
}

/// Write payloads and the payload-free manifest JSON to CAS.
///
/// Returns `(manifest_digest, payloads)` where `payloads` maps each torrent
/// hash that carried a `.torrent` file to its blob digest. Idempotent.
///
/// ## Errors
///
/// - `Serialization`: JSON encoding failed
/// - `Io` / `ConstraintViolation`: CAS write failed
pub fn persist_manifest_to_cas(
    store: &FsStore,
    manifest: &BackupManifest,
) -> Result<(String, BTreeMap<String, String>)> {
    let mut stripped = manifest.clone();
    let mut payloads = BTreeMap::new();

    for item in &mut stripped.items {
        if let Some(blob) = item.torrent_blob.take() {
            let digest = store.write(&blob, BlobKind::Torrent)?;
            payloads.insert(item.hash.clone(), digest);
        }
    }

    let json = serde_json::to_vec_pretty(&stripped).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("persist_manifest_to_cas")
            .with_message(format!("Failed to serialize manifest: {}", e))
    })?;
    let digest = store.write(&json, BlobKind::Manifest)?;

    tracing::debug!(
        digest = %digest,
        size_bytes = json.len(),
        payloads = payloads.len(),
        "Persisted manifest to CAS"
    );

    Ok((digest, payloads))
}

/// Record a backup run for `instance_id`.
///
/// Validates the manifest, writes it to CAS and inserts the ledger rows in
/// one transaction.
///
/// ## Errors
///
/// - `InvalidManifest`: the manifest fails validation, or its total size
///   does not fit the ledger column
/// - `Persistence`: ledger insert failed
/// - CAS errors from [`persist_manifest_to_cas`]
pub fn record_run(
    conn: &mut Connection,
    store: &FsStore,
    instance_id: &str,
    manifest: &BackupManifest,
) -> Result<RunRecord> {
    manifest.validate().map_err(ExError::from)?;
    let total_size_bytes = i64::try_from(manifest.total_size_bytes()).map_err(|_| {
        ExError::new(ExErrorKind::InvalidManifest)
            .with_op("record_run")
            .with_entity_id(instance_id)
            .with_message("total torrent size exceeds what the ledger can record")
    })?;

    let (manifest_digest, payloads) = persist_manifest_to_cas(store, manifest)?;
    let run_id = Uuid::now_v7().to_string();
    let recorded_at = chrono::Utc::now().timestamp_millis();

    let tx = conn.transaction().map_err(from_rusqlite)?;
    tx.execute(
        r#"
        INSERT INTO backup_runs (
            run_id,
            instance_id,
            generated_at,
            manifest_digest,
            category_count,
            tag_count,
            torrent_count,
            total_size_bytes,
            recorded_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        rusqlite::params![
            run_id,
            instance_id,
            manifest.generated_at.to_rfc3339(),
            manifest_digest,
            manifest.categories.len() as i64,
            manifest.tags.len() as i64,
            manifest.items.len() as i64,
            total_size_bytes,
            recorded_at,
        ],
    )
    .map_err(|e| {
        ExError::new(ExErrorKind::Persistence)
            .with_op("record_run")
            .with_entity_id(run_id.clone())
            .with_message(format!("Failed to insert backup run: {}", e))
    })?;

    for (hash, digest) in &payloads {
        tx.execute(
            "INSERT INTO run_payloads (run_id, torrent_hash, blob_digest) VALUES (?1, ?2, ?3)",
            rusqlite::params![run_id, hash, digest],
        )
        .map_err(from_rusqlite)?;
    }
    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(
        run_id = %run_id,
        instance = instance_id,
        torrents = manifest.items.len(),
        "Recorded backup run"
    );

    Ok(RunRecord {
        run_id,
        manifest_digest,
        payloads,
    })
}
