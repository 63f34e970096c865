//! Torvault Store - persisted backup runs
//!
//! Provides:
//! - SQLite ledger of backup runs with a migrations framework
//! - Content-addressable storage (CAS) for manifests and `.torrent` payloads
//! - Recording and loading backup manifests by run id

pub mod cas;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod runs;

// Re-export key types
pub use errors::Result;
pub use runs::{load_manifest, record_run, BackupRunRow, RunRecord};
