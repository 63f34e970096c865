//! Live client state as read fresh for each planning call

use crate::model::manifest::{CategorySnapshot, ContentLayout};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A torrent currently loaded in the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveTorrent {
    pub hash: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_layout: Option<ContentLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infohash_v1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infohash_v2: Option<String>,
}

impl LiveTorrent {
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
            category: None,
            tags: Vec::new(),
            size_bytes: 0,
            save_path: None,
            content_layout: None,
            infohash_v1: None,
            infohash_v2: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_save_path(mut self, save_path: impl Into<String>) -> Self {
        self.save_path = Some(save_path.into());
        self
    }
}

/// Client state keyed the same way as a manifest
///
/// Serialized with torrents as a plain list so a JSON state file stays easy
/// to edit by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LiveStateFile", into = "LiveStateFile")]
pub struct LiveState {
    pub categories: BTreeMap<String, CategorySnapshot>,
    pub tags: BTreeSet<String>,
    pub torrents: BTreeMap<String, LiveTorrent>,
}

impl LiveState {
    /// Assemble state from the adapter's three listings
    ///
    /// Torrents are keyed by hash; if the client reports a hash twice the
    /// later entry wins.
    pub fn from_parts(
        categories: BTreeMap<String, CategorySnapshot>,
        tags: impl IntoIterator<Item = String>,
        torrents: impl IntoIterator<Item = LiveTorrent>,
    ) -> Self {
        Self {
            categories,
            tags: tags.into_iter().collect(),
            torrents: torrents
                .into_iter()
                .map(|t| (t.hash.clone(), t))
                .collect(),
        }
    }

    pub fn torrent(&self, hash: &str) -> Option<&LiveTorrent> {
        self.torrents.get(hash)
    }
}

#[derive(Serialize, Deserialize)]
struct LiveStateFile {
    #[serde(default)]
    categories: BTreeMap<String, CategorySnapshot>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    torrents: Vec<LiveTorrent>,
}

impl From<LiveStateFile> for LiveState {
    fn from(file: LiveStateFile) -> Self {
        LiveState::from_parts(file.categories, file.tags, file.torrents)
    }
}

impl From<LiveState> for LiveStateFile {
    fn from(state: LiveState) -> Self {
        Self {
            categories: state.categories,
            tags: state.tags,
            torrents: state.torrents.into_values().collect(),
        }
    }
}
