//! The restore plan value type

use crate::diff::{CategoryDiff, RestoreDiff, TagDiff, TorrentDiff};
use crate::errors::Result;
use crate::model::RestoreMode;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Computed, side-effect-free set of operations reconciling a client toward
/// a backup
///
/// A plan holds no timestamps, so two computations over identical inputs
/// serialize to identical bytes and share a [`digest`](Self::digest).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestorePlan {
    pub run_id: String,
    pub mode: RestoreMode,
    pub categories: CategoryDiff,
    pub tags: TagDiff,
    pub torrents: TorrentDiff,
}

/// Number of entries per plan bucket
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanCounts {
    pub categories_create: usize,
    pub categories_update: usize,
    pub categories_delete: usize,
    pub tags_create: usize,
    pub tags_delete: usize,
    pub torrents_add: usize,
    pub torrents_update: usize,
    pub torrents_delete: usize,
}

impl PlanCounts {
    pub fn total(&self) -> usize {
        self.categories_create
            + self.categories_update
            + self.categories_delete
            + self.tags_create
            + self.tags_delete
            + self.torrents_add
            + self.torrents_update
            + self.torrents_delete
    }
}

impl RestorePlan {
    pub fn from_diff(run_id: impl Into<String>, mode: RestoreMode, diff: RestoreDiff) -> Self {
        Self {
            run_id: run_id.into(),
            mode,
            categories: diff.categories,
            tags: diff.tags,
            torrents: diff.torrents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.tags.is_empty() && self.torrents.is_empty()
    }

    pub fn counts(&self) -> PlanCounts {
        PlanCounts {
            categories_create: self.categories.create.len(),
            categories_update: self.categories.update.len(),
            categories_delete: self.categories.delete.len(),
            tags_create: self.tags.create.len(),
            tags_delete: self.tags.delete.len(),
            torrents_add: self.torrents.add.len(),
            torrents_update: self.torrents.update.len(),
            torrents_delete: self.torrents.delete.len(),
        }
    }

    /// SHA-256 (hex) of the plan's JSON form
    ///
    /// # Errors
    ///
    /// `Serialization` if the plan cannot be encoded.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Every torrent hash the plan touches, in bucket order
    pub fn torrent_hashes(&self) -> impl Iterator<Item = &str> {
        self.torrents
            .add
            .iter()
            .map(|a| a.hash())
            .chain(self.torrents.update.iter().map(|u| u.hash.as_str()))
            .chain(self.torrents.delete.iter().map(String::as_str))
    }
}
