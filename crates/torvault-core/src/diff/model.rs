//! Diff bucket types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Buckets are sorted `Vec`s so serialization is deterministic.

use crate::classify::Change;
use crate::model::{ManifestItem, TorrentView};
use serde::{Deserialize, Serialize};

/// A manifest category missing from the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCreate {
    pub name: String,
    pub save_path: String,
}

/// A category present on both sides with a different save path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryUpdate {
    pub name: String,
    pub current_path: String,
    pub desired_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDiff {
    pub create: Vec<CategoryCreate>,
    pub update: Vec<CategoryUpdate>,
    /// Names of live categories absent from the manifest
    pub delete: Vec<String>,
}

impl CategoryDiff {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCreate {
    pub name: String,
}

/// Tags carry no mutable fields, so there is no update bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagDiff {
    pub create: Vec<TagCreate>,
    pub delete: Vec<String>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.delete.is_empty()
    }
}

/// A manifest torrent missing from the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TorrentAdd {
    pub manifest: ManifestItem,
}

impl TorrentAdd {
    pub fn hash(&self) -> &str {
        &self.manifest.hash
    }
}

/// A torrent present on both sides that differs in at least one field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TorrentUpdate {
    pub hash: String,
    pub current: TorrentView,
    pub desired: TorrentView,
    /// Never empty
    pub changes: Vec<Change>,
}

impl TorrentUpdate {
    pub fn supported_changes(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| c.supported)
    }

    pub fn unsupported_changes(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| !c.supported)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TorrentDiff {
    pub add: Vec<TorrentAdd>,
    pub update: Vec<TorrentUpdate>,
    /// Hashes of live torrents absent from the manifest
    pub delete: Vec<String>,
}

impl TorrentDiff {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Output of [`compute_diff`](crate::diff::compute_diff)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestoreDiff {
    pub categories: CategoryDiff,
    pub tags: TagDiff,
    pub torrents: TorrentDiff,
}
