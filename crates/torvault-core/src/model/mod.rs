//! Value types for backup manifests and live client state

pub mod live;
pub mod manifest;
pub mod mode;
pub mod torrent;

pub use live::{LiveState, LiveTorrent};
pub use manifest::{BackupManifest, CategorySnapshot, ContentLayout, ManifestItem};
pub use mode::RestoreMode;
pub use torrent::TorrentView;

/// Treat an empty category as "uncategorized"
pub(crate) fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
