//! Torvault Engine - Restore orchestration
//!
//! Coordinates the pure restore kernel in `torvault-core` with a snapshot
//! store and a live torrent client:
//! - collaborator contracts ([`SnapshotStore`], [`ClientAdapter`])
//! - plan building with I/O, timeouts and error mapping
//! - dependency-ordered execution with dry-run and cancellation
//! - per-instance execution locks and the plan cache
//!
//! [`RestoreService`] exposes the two entry points, `build_plan` and
//! `execute`.

pub mod client;
pub mod executor;
pub mod locks;
pub mod planner;
pub mod ports;
pub mod service;
pub mod settings;
pub mod snapshot_store;

pub use client::InMemoryClient;
pub use locks::InstanceLocks;
pub use ports::{ClientAdapter, ClientError, ClientErrorKind, SnapshotStore, TorrentUpdateReport};
pub use service::RestoreService;
pub use settings::RestoreSettings;
pub use snapshot_store::{LedgerSnapshotStore, MemorySnapshotStore};
