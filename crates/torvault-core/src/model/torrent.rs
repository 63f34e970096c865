use crate::model::live::LiveTorrent;
use crate::model::manifest::{ContentLayout, ManifestItem};
use crate::model::normalize_category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The comparable projection of a torrent, shared by both sides of a diff
///
/// Plan update entries carry one of these for the current and the desired
/// side. Category is normalized (blank means uncategorized) and tags are a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentView {
    pub hash: String,
    pub name: String,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_layout: Option<ContentLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infohash_v1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infohash_v2: Option<String>,
}

impl From<&ManifestItem> for TorrentView {
    fn from(item: &ManifestItem) -> Self {
        Self {
            hash: item.hash.clone(),
            name: item.name.clone(),
            category: normalize_category(item.category.as_deref()),
            tags: item.tags.iter().cloned().collect(),
            save_path: item.save_path.clone(),
            content_layout: item.content_layout,
            infohash_v1: item.infohash_v1.clone(),
            infohash_v2: item.infohash_v2.clone(),
        }
    }
}

impl From<&LiveTorrent> for TorrentView {
    fn from(torrent: &LiveTorrent) -> Self {
        Self {
            hash: torrent.hash.clone(),
            name: torrent.name.clone(),
            category: normalize_category(torrent.category.as_deref()),
            tags: torrent.tags.iter().cloned().collect(),
            save_path: torrent.save_path.clone(),
            content_layout: torrent.content_layout,
            infohash_v1: torrent.infohash_v1.clone(),
            infohash_v2: torrent.infohash_v2.clone(),
        }
    }
}
