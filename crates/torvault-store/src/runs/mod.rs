//! Backup run persistence.
//!
//! A recorded run is one SQLite ledger row plus CAS blobs: the manifest
//! JSON (payloads stripped) and one blob per `.torrent` payload. Payload
//! digests are kept in `run_payloads`.
//!
//! ## Responsibilities
//!
//! - Persist manifests and payloads to CAS
//! - Create ledger rows atomically
//! - Load manifests by run id, re-hydrating payloads
//!
//! ## Non-Responsibilities
//!
//! - Planning and execution (handled by `torvault-engine`)

pub mod persist;
pub mod query;

pub use persist::{persist_manifest_to_cas, record_run, RunRecord};
pub use query::{fetch_run_row, list_payloads, list_runs, load_manifest, BackupRunRow};
