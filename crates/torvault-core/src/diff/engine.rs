//! Restore diff computation.
//!
//! The core entry point is [`compute_diff`]. It trusts the manifest to be
//! valid; callers run [`BackupManifest::validate`] first.

use crate::classify::{classify, CapabilityGate};
use crate::diff::model::{
    CategoryCreate, CategoryDiff, CategoryUpdate, RestoreDiff, TagCreate, TagDiff, TorrentAdd,
    TorrentDiff, TorrentUpdate,
};
use crate::model::{BackupManifest, LiveState, ManifestItem, RestoreMode, TorrentView};
use std::collections::BTreeSet;

/// Compute the work needed to move `live` toward `manifest` under `mode`
pub fn compute_diff(
    manifest: &BackupManifest,
    live: &LiveState,
    mode: RestoreMode,
    gate: &dyn CapabilityGate,
) -> RestoreDiff {
    RestoreDiff {
        categories: diff_categories(manifest, live, mode),
        tags: diff_tags(manifest, live, mode),
        torrents: diff_torrents(manifest, live, mode, gate),
    }
}

fn diff_categories(
    manifest: &BackupManifest,
    live: &LiveState,
    mode: RestoreMode,
) -> CategoryDiff {
    let mut diff = CategoryDiff::default();

    // BTreeMap iteration keeps both buckets sorted by name
    for (name, desired) in &manifest.categories {
        match live.categories.get(name) {
            None => diff.create.push(CategoryCreate {
                name: name.clone(),
                save_path: desired.save_path.clone(),
            }),
            Some(current) if mode.updates_existing() && current.save_path != desired.save_path => {
                diff.update.push(CategoryUpdate {
                    name: name.clone(),
                    current_path: current.save_path.clone(),
                    desired_path: desired.save_path.clone(),
                })
            }
            Some(_) => {}
        }
    }

    if mode.removes_extraneous() {
        diff.delete = live
            .categories
            .keys()
            .filter(|name| !manifest.categories.contains_key(*name))
            .cloned()
            .collect();
    }

    diff
}

fn diff_tags(manifest: &BackupManifest, live: &LiveState, mode: RestoreMode) -> TagDiff {
    let create = manifest
        .tags
        .difference(&live.tags)
        .map(|name| TagCreate { name: name.clone() })
        .collect();

    let delete = if mode.removes_extraneous() {
        live.tags.difference(&manifest.tags).cloned().collect()
    } else {
        Vec::new()
    };

    TagDiff { create, delete }
}

fn diff_torrents(
    manifest: &BackupManifest,
    live: &LiveState,
    mode: RestoreMode,
    gate: &dyn CapabilityGate,
) -> TorrentDiff {
    let mut diff = TorrentDiff::default();

    let mut items: Vec<&ManifestItem> = manifest.items.iter().collect();
    items.sort_by(|a, b| a.hash.cmp(&b.hash));

    for item in items {
        let Some(current) = live.torrent(&item.hash) else {
            diff.add.push(TorrentAdd {
                manifest: item.clone(),
            });
            continue;
        };

        if !mode.updates_existing() {
            continue;
        }

        let current = TorrentView::from(current);
        let desired = TorrentView::from(item);
        let changes = classify(&current, &desired, gate);
        if changes.is_empty() {
            continue;
        }

        diff.update.push(TorrentUpdate {
            hash: item.hash.clone(),
            current,
            desired,
            changes,
        });
    }

    if mode.removes_extraneous() {
        let wanted: BTreeSet<&str> = manifest.items.iter().map(|i| i.hash.as_str()).collect();
        diff.delete = live
            .torrents
            .keys()
            .filter(|hash| !wanted.contains(hash.as_str()))
            .cloned()
            .collect();
    }

    diff
}
