//! Torvault Core - pure restore reconciliation kernel
//!
//! This crate provides the I/O-free half of restoring a torrent client from a
//! backup:
//! - Backup manifest and live client state models
//! - Field registry and capability-gated change classification
//! - Mode-dependent diff engine
//! - Plan assembly, exclusion filtering and digests
//! - Execution result types, behavior-flag guard and session state machine
//! - Markdown summaries, error facility and logging facility
//!
//! Loading manifests, talking to a client and executing plans live in
//! `torvault-engine`.

pub mod classify;
pub mod diff;
pub mod errors;
pub mod flags;
pub mod logging_facility;
pub mod model;
pub mod plan;
pub mod result;
pub mod session;
pub mod summary;

// Used by the logging macros
pub use torvault_core_types;

// Re-export commonly used types
pub use classify::{
    ApiVersion, ApiVersionCapabilities, CapabilityGate, Change, FieldValue, FixedCapabilities,
    TorrentField,
};
pub use diff::compute_diff;
pub use errors::{ExError, ExErrorKind, RestoreError, Result};
pub use flags::BehaviorFlags;
pub use model::{BackupManifest, LiveState, LiveTorrent, ManifestItem, RestoreMode, TorrentView};
pub use plan::{assemble_plan, ExcludeSet, PlanRequest, RestorePlan};
pub use result::{AppliedCounts, OperationError, OperationKind, RestoreResult};
pub use session::{RestoreSession, SessionState};
