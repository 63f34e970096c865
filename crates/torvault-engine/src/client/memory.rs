//! In-memory client adapter, optionally backed by a JSON state file

#![allow(clippy::result_large_err)]

use crate::ports::{ClientAdapter, ClientError, TorrentUpdateReport};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use torvault_core::errors::{ExError, ExErrorKind};
use torvault_core::model::CategorySnapshot;
use torvault_core::{
    BehaviorFlags, Change, FieldValue, LiveState, LiveTorrent, ManifestItem, TorrentField,
};

/// A client whose whole state is a [`LiveState`] held in memory
///
/// Behaves like a lenient torrent client: adding a torrent creates any
/// category or tag it references, deleting a category uncategorizes its
/// torrents, deleting a tag strips it from every torrent.
#[derive(Debug)]
pub struct InMemoryClient {
    instance_id: String,
    state: Mutex<LiveState>,
    add_flags: Mutex<BTreeMap<String, BehaviorFlags>>,
    offline: AtomicBool,
}

impl InMemoryClient {
    pub fn new(instance_id: impl Into<String>, state: LiveState) -> Self {
        Self {
            instance_id: instance_id.into(),
            state: Mutex::new(state),
            add_flags: Mutex::new(BTreeMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Load state from a JSON file; a missing file means an empty client
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Serialization` if it does not parse.
    pub fn load_json(instance_id: impl Into<String>, path: &Path) -> Result<Self, ExError> {
        if !path.exists() {
            return Ok(Self::new(instance_id, LiveState::default()));
        }
        let bytes = std::fs::read(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_client_state")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })?;
        let state: LiveState = serde_json::from_slice(&bytes).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("load_client_state")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })?;
        Ok(Self::new(instance_id, state))
    }

    /// Write the current state back as pretty JSON
    ///
    /// # Errors
    ///
    /// `Serialization` or `Io` on failure.
    pub fn save_json(&self, path: &Path) -> Result<(), ExError> {
        let json = serde_json::to_vec_pretty(&self.snapshot()).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("save_client_state")
                .with_message(e.to_string())
        })?;
        std::fs::write(path, json).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("save_client_state")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> LiveState {
        self.state().clone()
    }

    /// Flags the torrent was last added with
    pub fn add_flags(&self, hash: &str) -> Option<BehaviorFlags> {
        self.add_flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(hash)
            .copied()
    }

    /// While offline every call fails with `Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn state(&self) -> MutexGuard<'_, LiveState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn online(&self) -> Result<MutexGuard<'_, LiveState>, ClientError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::unavailable(format!(
                "instance {} is offline",
                self.instance_id
            )));
        }
        Ok(self.state())
    }
}

fn text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Set(_) => None,
    }
}

#[async_trait]
impl ClientAdapter for InMemoryClient {
    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn list_categories(&self) -> Result<BTreeMap<String, CategorySnapshot>, ClientError> {
        Ok(self.online()?.categories.clone())
    }

    async fn list_tags(&self) -> Result<Vec<String>, ClientError> {
        Ok(self.online()?.tags.iter().cloned().collect())
    }

    async fn list_torrents(&self) -> Result<Vec<LiveTorrent>, ClientError> {
        Ok(self.online()?.torrents.values().cloned().collect())
    }

    async fn create_category(&self, name: &str, save_path: &str) -> Result<(), ClientError> {
        let mut state = self.online()?;
        if state.categories.contains_key(name) {
            return Err(ClientError::conflict(format!("category {} exists", name)));
        }
        state
            .categories
            .insert(name.to_string(), CategorySnapshot::new(save_path));
        Ok(())
    }

    async fn update_category(&self, name: &str, save_path: &str) -> Result<(), ClientError> {
        let mut state = self.online()?;
        let category = state
            .categories
            .get_mut(name)
            .ok_or_else(|| ClientError::not_found(format!("category {}", name)))?;
        category.save_path = save_path.to_string();
        Ok(())
    }

    async fn delete_category(&self, name: &str) -> Result<(), ClientError> {
        let mut state = self.online()?;
        if state.categories.remove(name).is_none() {
            return Err(ClientError::not_found(format!("category {}", name)));
        }
        for torrent in state.torrents.values_mut() {
            if torrent.category.as_deref() == Some(name) {
                torrent.category = None;
            }
        }
        Ok(())
    }

    async fn create_tag(&self, name: &str) -> Result<(), ClientError> {
        let mut state = self.online()?;
        if !state.tags.insert(name.to_string()) {
            return Err(ClientError::conflict(format!("tag {} exists", name)));
        }
        Ok(())
    }

    async fn delete_tag(&self, name: &str) -> Result<(), ClientError> {
        let mut state = self.online()?;
        if !state.tags.remove(name) {
            return Err(ClientError::not_found(format!("tag {}", name)));
        }
        for torrent in state.torrents.values_mut() {
            torrent.tags.retain(|t| t != name);
        }
        Ok(())
    }

    async fn add_torrent(&self, item: &ManifestItem, flags: BehaviorFlags) -> Result<(), ClientError> {
        let mut state = self.online()?;
        if !item.has_payload() {
            return Err(ClientError::rejected("no .torrent payload supplied"));
        }
        if state.torrents.contains_key(&item.hash) {
            return Err(ClientError::conflict(format!("torrent {} exists", item.hash)));
        }

        let category = item.category.clone().filter(|c| !c.trim().is_empty());
        let category_path = match &category {
            Some(name) => Some(
                state
                    .categories
                    .entry(name.clone())
                    .or_insert_with(|| CategorySnapshot::new(""))
                    .save_path
                    .clone(),
            ),
            None => None,
        };
        state.tags.extend(item.tags.iter().cloned());

        state.torrents.insert(
            item.hash.clone(),
            LiveTorrent {
                hash: item.hash.clone(),
                name: item.name.clone(),
                category,
                tags: item.tags.clone(),
                size_bytes: item.size_bytes,
                save_path: item.save_path.clone().or(category_path),
                content_layout: item.content_layout,
                infohash_v1: item.infohash_v1.clone(),
                infohash_v2: item.infohash_v2.clone(),
            },
        );
        drop(state);

        self.add_flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(item.hash.clone(), flags);
        Ok(())
    }

    async fn update_torrent(
        &self,
        hash: &str,
        changes: &[Change],
    ) -> Result<TorrentUpdateReport, ClientError> {
        let mut state = self.online()?;
        let mut report = TorrentUpdateReport::default();

        let mut new_tags = Vec::new();
        {
            let torrent = state
                .torrents
                .get_mut(hash)
                .ok_or_else(|| ClientError::not_found(format!("torrent {}", hash)))?;

            for change in changes {
                match (change.field, &change.desired) {
                    (TorrentField::Name, desired) => match text(desired) {
                        Some(name) => torrent.name = name,
                        None => report.unresolved.push(change.field),
                    },
                    (TorrentField::Category, desired) => torrent.category = text(desired),
                    (TorrentField::Tags, FieldValue::Set(tags)) => {
                        torrent.tags = tags.iter().cloned().collect();
                        new_tags.extend(tags.iter().cloned());
                    }
                    (TorrentField::SavePath, desired) => match text(desired) {
                        Some(path) => torrent.save_path = Some(path),
                        None => report.unresolved.push(change.field),
                    },
                    // Layout and identity are fixed once a torrent is loaded
                    _ => report.unresolved.push(change.field),
                }
            }
        }
        state.tags.extend(new_tags);

        Ok(report)
    }

    async fn delete_torrent(&self, hash: &str) -> Result<(), ClientError> {
        let mut state = self.online()?;
        if state.torrents.remove(hash).is_none() {
            return Err(ClientError::not_found(format!("torrent {}", hash)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ClientErrorKind;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn client() -> InMemoryClient {
        InMemoryClient::new("home", LiveState::default())
    }

    #[tokio::test]
    async fn test_add_torrent_creates_referenced_category_and_tags() {
        let client = client();
        let item = ManifestItem::new("abc", "A", 1)
            .with_category("Movies")
            .with_tags(["4k"])
            .with_torrent_blob(b"d4:infoe".to_vec());
        let flags = BehaviorFlags {
            start_paused: true,
            ..BehaviorFlags::default()
        };

        client.add_torrent(&item, flags).await.unwrap();

        let state = client.snapshot();
        assert!(state.categories.contains_key("Movies"));
        assert!(state.tags.contains("4k"));
        assert_eq!(client.add_flags("abc"), Some(flags));
    }

    #[tokio::test]
    async fn test_add_without_payload_rejected() {
        let err = client()
            .add_torrent(&ManifestItem::new("abc", "A", 1), BehaviorFlags::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ClientErrorKind::Rejected);
    }

    #[tokio::test]
    async fn test_delete_tag_strips_torrents() {
        let mut state = LiveState::default();
        state.tags.insert("4k".into());
        state.torrents.insert(
            "abc".into(),
            LiveTorrent::new("abc", "A").with_tags(["4k", "hdr"]),
        );
        let client = InMemoryClient::new("home", state);

        client.delete_tag("4k").await.unwrap();
        assert_eq!(client.snapshot().torrents["abc"].tags, vec!["hdr".to_string()]);
        assert_eq!(
            client.delete_tag("4k").await.unwrap_err().kind,
            ClientErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_update_reports_unresolvable_fields() {
        let mut state = LiveState::default();
        state
            .torrents
            .insert("abc".into(), LiveTorrent::new("abc", "Old"));
        let client = InMemoryClient::new("home", state);

        let changes = vec![
            Change {
                field: TorrentField::Name,
                current: FieldValue::Text(Some("Old".into())),
                desired: FieldValue::Text(Some("New".into())),
                supported: true,
                message: None,
            },
            Change {
                field: TorrentField::Tags,
                current: FieldValue::Set(BTreeSet::new()),
                desired: FieldValue::Set(["x".to_string()].into_iter().collect()),
                supported: true,
                message: None,
            },
            Change {
                field: TorrentField::ContentLayout,
                current: FieldValue::Text(None),
                desired: FieldValue::Text(Some("Subfolder".into())),
                supported: true,
                message: None,
            },
        ];
        let report = client.update_torrent("abc", &changes).await.unwrap();

        assert_eq!(report.unresolved, vec![TorrentField::ContentLayout]);
        let state = client.snapshot();
        assert_eq!(state.torrents["abc"].name, "New");
        assert!(state.tags.contains("x"));
    }

    #[tokio::test]
    async fn test_offline_client_is_unavailable() {
        let client = client();
        client.set_offline(true);
        assert_eq!(
            client.list_torrents().await.unwrap_err().kind,
            ClientErrorKind::Unavailable
        );
    }

    #[test]
    fn test_state_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let missing = InMemoryClient::load_json("home", &path).unwrap();
        assert_eq!(missing.snapshot(), LiveState::default());

        let mut state = LiveState::default();
        state.tags.insert("4k".into());
        InMemoryClient::new("home", state.clone())
            .save_json(&path)
            .unwrap();
        let loaded = InMemoryClient::load_json("home", &path).unwrap();
        assert_eq!(loaded.snapshot(), state);
    }
}
