//! Read-only backup run queries.

#![allow(clippy::result_large_err)]

use crate::cas::FsStore;
use crate::errors::{from_rusqlite, run_not_found, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;
use torvault_core::errors::{ExError, ExErrorKind};
use torvault_core::BackupManifest;

/// A raw row from the `backup_runs` ledger table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRunRow {
    pub run_id: String,
    pub instance_id: String,
    /// RFC 3339 capture time of the manifest
    pub generated_at: String,
    pub manifest_digest: String,
    pub category_count: i64,
    pub tag_count: i64,
    pub torrent_count: i64,
    pub total_size_bytes: i64,
    /// Milliseconds since epoch
    pub recorded_at: i64,
}

const RUN_COLUMNS: &str = "run_id, instance_id, generated_at, manifest_digest, category_count,
                           tag_count, torrent_count, total_size_bytes, recorded_at";

/// Fetch a ledger row by run id.
///
/// # Errors
///
/// - `NotFound`: no run with this id
/// - `Persistence`: SQLite read failed
pub fn fetch_run_row(conn: &Connection, run_id: &str) -> Result<BackupRunRow> {
    conn.query_row(
        &format!("SELECT {} FROM backup_runs WHERE run_id = ?1", RUN_COLUMNS),
        [run_id],
        row_to_run_row,
    )
    .optional()
    .map_err(from_rusqlite)?
    .ok_or_else(|| run_not_found("fetch_run_row", run_id))
}

/// List runs, optionally for one instance, ordered by `recorded_at`, `run_id`.
pub fn list_runs(conn: &Connection, instance_id: Option<&str>) -> Result<Vec<BackupRunRow>> {
    let rows = match instance_id {
        None => {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM backup_runs ORDER BY recorded_at, run_id",
                    RUN_COLUMNS
                ))
                .map_err(from_rusqlite)?;
            let result: std::result::Result<Vec<_>, _> = stmt
                .query_map([], row_to_run_row)
                .map_err(from_rusqlite)?
                .collect();
            result.map_err(from_rusqlite)?
        }
        Some(instance) => {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM backup_runs WHERE instance_id = ?1
                     ORDER BY recorded_at, run_id",
                    RUN_COLUMNS
                ))
                .map_err(from_rusqlite)?;
            let result: std::result::Result<Vec<_>, _> = stmt
                .query_map([instance], row_to_run_row)
                .map_err(from_rusqlite)?
                .collect();
            result.map_err(from_rusqlite)?
        }
    };
    Ok(rows)
}

/// Payload digests recorded for a run, keyed by torrent hash.
pub fn list_payloads(conn: &Connection, run_id: &str) -> Result<BTreeMap<String, String>> {
    let mut stmt = conn
        .prepare("SELECT torrent_hash, blob_digest FROM run_payloads WHERE run_id = ?1")
        .map_err(from_rusqlite)?;
    let result: std::result::Result<BTreeMap<_, _>, _> = stmt
        .query_map([run_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?
        .collect();
    result.map_err(from_rusqlite)
}

/// Load the manifest recorded under `run_id`, with payloads re-hydrated.
///
/// A payload blob missing from CAS is logged and leaves the item without a
/// payload; a missing manifest blob is an error.
///
/// # Errors
///
/// - `NotFound`: no run with this id
/// - `MissingBlob`: the manifest blob is absent from CAS
/// - `InvalidManifest`: the stored manifest JSON does not parse
pub fn load_manifest(conn: &Connection, cas: &FsStore, run_id: &str) -> Result<BackupManifest> {
    let row = fetch_run_row(conn, run_id)?;

    let bytes = cas.read(&row.manifest_digest).map_err(|e| {
        if e.kind() == ExErrorKind::NotFound {
            ExError::new(ExErrorKind::MissingBlob)
                .with_op("load_manifest")
                .with_entity_id(row.manifest_digest.clone())
                .with_message("manifest blob not found in CAS")
        } else {
            e
        }
    })?;

    let mut manifest = BackupManifest::from_json_slice(&bytes).map_err(|e| {
        ExError::new(ExErrorKind::InvalidManifest)
            .with_op("load_manifest")
            .with_entity_id(run_id)
            .with_message(e.to_string())
    })?;

    let payloads = list_payloads(conn, run_id)?;
    for item in &mut manifest.items {
        let Some(digest) = payloads.get(&item.hash) else {
            continue;
        };
        match cas.read(digest) {
            Ok(blob) => item.torrent_blob = Some(blob),
            Err(e) if e.kind() == ExErrorKind::NotFound => {
                tracing::warn!(
                    run_id = run_id,
                    hash = %item.hash,
                    digest = %digest,
                    "Torrent payload missing from CAS"
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(manifest)
}

fn row_to_run_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BackupRunRow> {
    Ok(BackupRunRow {
        run_id: row.get(0)?,
        instance_id: row.get(1)?,
        generated_at: row.get(2)?,
        manifest_digest: row.get(3)?,
        category_count: row.get(4)?,
        tag_count: row.get(5)?,
        torrent_count: row.get(6)?,
        total_size_bytes: row.get(7)?,
        recorded_at: row.get(8)?,
    })
}
