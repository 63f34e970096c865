use chrono::{TimeZone, Utc};
use torvault_core::model::CategorySnapshot;
use torvault_core::{BackupManifest, LiveState, LiveTorrent, ManifestItem};

/// Manifest used by the worked examples: one category, one tag, one torrent
#[allow(dead_code)]
pub fn example_manifest() -> BackupManifest {
    let mut manifest = BackupManifest::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    manifest
        .categories
        .insert("Movies".to_string(), CategorySnapshot::new("/m"));
    manifest.tags.insert("4k".to_string());
    manifest.items.push(
        ManifestItem::new("abc", "Some Movie", 4_000)
            .with_category("Movies")
            .with_tags(["4k"])
            .with_torrent_blob(b"d4:infod4:name10:Some Moviee".to_vec()),
    );
    manifest
}

#[allow(dead_code)]
pub fn empty_live() -> LiveState {
    LiveState::default()
}

/// Live state that already holds `Movies` at another path
#[allow(dead_code)]
pub fn live_with_old_movies_path() -> LiveState {
    let mut live = LiveState::default();
    live.categories
        .insert("Movies".to_string(), CategorySnapshot::new("/old"));
    live
}

/// Live state with an extra torrent `xyz` unknown to the manifest
#[allow(dead_code)]
pub fn live_with_stray_torrent() -> LiveState {
    let mut live = LiveState::default();
    live.torrents
        .insert("xyz".to_string(), LiveTorrent::new("xyz", "Stray"));
    live
}
