//! Restore diff engine.
//!
//! Compares a backup manifest with live client state and produces the
//! mode-dependent buckets of work needed to bring the client toward the
//! manifest.
//!
//! ## Entry point
//!
//! ```ignore
//! use torvault_core::diff::compute_diff;
//!
//! let diff = compute_diff(&manifest, &live, RestoreMode::Overwrite, &gate);
//! ```
//!
//! ## Guarantees
//!
//! - **Purity**: no I/O; identical inputs produce identical output.
//! - **Ordering**: every bucket is sorted ascending by category name, tag
//!   name or torrent hash.
//! - **Minimality**: a torrent update entry always carries at least one change.
//! - **Disjointness**: a hash lands in at most one of add, update and delete.

pub mod engine;
pub mod model;

pub use engine::compute_diff;
pub use model::{
    CategoryCreate, CategoryDiff, CategoryUpdate, RestoreDiff, TagCreate, TagDiff, TorrentAdd,
    TorrentDiff, TorrentUpdate,
};
