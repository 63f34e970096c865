//! Execution outcome types

use crate::model::RestoreMode;
use crate::plan::RestorePlan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight mutations an executor can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    CreateTag,
    DeleteTag,
    AddTorrent,
    UpdateTorrent,
    DeleteTorrent,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::CreateCategory => "create_category",
            OperationKind::UpdateCategory => "update_category",
            OperationKind::DeleteCategory => "delete_category",
            OperationKind::CreateTag => "create_tag",
            OperationKind::DeleteTag => "delete_tag",
            OperationKind::AddTorrent => "add_torrent",
            OperationKind::UpdateTorrent => "update_torrent",
            OperationKind::DeleteTorrent => "delete_torrent",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub created: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentCounts {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Operations applied (or, in a dry run, that would be applied)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCounts {
    pub categories: CategoryCounts,
    pub tags: TagCounts,
    pub torrents: TorrentCounts,
}

impl AppliedCounts {
    pub fn record(&mut self, kind: OperationKind) {
        match kind {
            OperationKind::CreateCategory => self.categories.created += 1,
            OperationKind::UpdateCategory => self.categories.updated += 1,
            OperationKind::DeleteCategory => self.categories.deleted += 1,
            OperationKind::CreateTag => self.tags.created += 1,
            OperationKind::DeleteTag => self.tags.deleted += 1,
            OperationKind::AddTorrent => self.torrents.added += 1,
            OperationKind::UpdateTorrent => self.torrents.updated += 1,
            OperationKind::DeleteTorrent => self.torrents.deleted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.categories.created
            + self.categories.updated
            + self.categories.deleted
            + self.tags.created
            + self.tags.deleted
            + self.torrents.added
            + self.torrents.updated
            + self.torrents.deleted
    }
}

/// A single failed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    pub operation: OperationKind,
    /// Category name, tag name or torrent hash
    pub target: String,
    pub message: String,
    /// Stable error code (`ERR_OPERATION_FAILED`, `ERR_TIMEOUT`)
    pub code: String,
}

/// Outcome of one execute call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreResult {
    pub dry_run: bool,
    pub mode: RestoreMode,
    pub plan: RestorePlan,
    pub applied: AppliedCounts,
    pub warnings: Vec<String>,
    pub errors: Vec<OperationError>,
    /// Execution stopped early on request; `applied` covers what ran
    pub cancelled: bool,
    /// The plan came from the plan cache rather than a fresh computation
    pub plan_reused: bool,
}

impl RestoreResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_by_kind() {
        let mut applied = AppliedCounts::default();
        applied.record(OperationKind::CreateCategory);
        applied.record(OperationKind::AddTorrent);
        applied.record(OperationKind::AddTorrent);
        applied.record(OperationKind::DeleteTag);
        assert_eq!(applied.categories.created, 1);
        assert_eq!(applied.torrents.added, 2);
        assert_eq!(applied.tags.deleted, 1);
        assert_eq!(applied.total(), 4);
    }

    #[test]
    fn test_operation_kind_serializes_snake_case() {
        let json = serde_json::to_string(&OperationKind::UpdateTorrent).unwrap();
        assert_eq!(json, "\"update_torrent\"");
        assert_eq!(OperationKind::UpdateTorrent.to_string(), "update_torrent");
    }
}
