use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use torvault_core::model::CategorySnapshot;
use torvault_core::{
    BackupManifest, BehaviorFlags, Change, FixedCapabilities, LiveState, LiveTorrent,
    ManifestItem,
};
use torvault_engine::{
    ClientAdapter, ClientError, InMemoryClient, InstanceLocks, MemorySnapshotStore,
    RestoreService, RestoreSettings, TorrentUpdateReport,
};

pub const RUN_ID: &str = "run-1";

/// Manifest with one category, two tags and two torrents
#[allow(dead_code)]
pub fn manifest() -> BackupManifest {
    let mut manifest = BackupManifest::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    manifest
        .categories
        .insert("Movies".to_string(), CategorySnapshot::new("/m"));
    manifest.tags.insert("4k".to_string());
    manifest.tags.insert("hdr".to_string());
    manifest.items.push(
        ManifestItem::new("abc", "Some Movie", 4_000)
            .with_category("Movies")
            .with_tags(["4k"])
            .with_torrent_blob(b"d4:infod4:name10:Some Moviee".to_vec()),
    );
    manifest.items.push(
        ManifestItem::new("def", "Other Movie", 2_000)
            .with_category("Movies")
            .with_tags(["hdr"])
            .with_torrent_blob(b"d4:infod4:name11:Other Moviee".to_vec()),
    );
    manifest
}

/// Live state touching every bucket of a `complete` restore of [`manifest`]
#[allow(dead_code)]
pub fn drifted_live() -> LiveState {
    let mut live = LiveState::default();
    live.categories
        .insert("Old".to_string(), CategorySnapshot::new("/old"));
    live.tags.insert("stale".to_string());
    live.torrents.insert(
        "def".to_string(),
        LiveTorrent::new("def", "Renamed").with_category("Movies"),
    );
    live.torrents
        .insert("xyz".to_string(), LiveTorrent::new("xyz", "Stray").with_category("Old"));
    live
}

/// Client adapter that records every call and can be told to fail or stall
///
/// Calls are recorded as `"<method>:<target>"` before anything else happens.
#[allow(dead_code)]
pub struct RecordingClient {
    pub inner: InMemoryClient,
    pub calls: Mutex<Vec<String>>,
    failures: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    cancel_after: Mutex<Option<(usize, CancellationToken)>>,
}

#[allow(dead_code)]
impl RecordingClient {
    pub fn new(state: LiveState) -> Self {
        Self {
            inner: InMemoryClient::new("home", state),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashSet::new()),
            delays: Mutex::new(HashMap::new()),
            cancel_after: Mutex::new(None),
        }
    }

    pub fn fail_on(self, call: &str) -> Self {
        self.failures.lock().unwrap().insert(call.to_string());
        self
    }

    pub fn delay_on(self, call: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(call.to_string(), delay);
        self
    }

    /// Cancel `token` once `count` mutating calls have completed
    pub fn cancel_after(self, count: usize, token: CancellationToken) -> Self {
        *self.cancel_after.lock().unwrap() = Some((count, token));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls excluding the three listings
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list_"))
            .collect()
    }

    async fn enter(&self, call: String) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call.clone());
        let delay = self.delays.lock().unwrap().get(&call).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failures.lock().unwrap().contains(&call) {
            return Err(ClientError::rejected(format!("injected failure for {}", call)));
        }
        Ok(())
    }

    fn leave(&self) {
        let mutations = self.mutations().len();
        if let Some((count, token)) = self.cancel_after.lock().unwrap().as_ref() {
            if mutations >= *count {
                token.cancel();
            }
        }
    }
}

#[async_trait]
impl ClientAdapter for RecordingClient {
    fn instance_id(&self) -> &str {
        self.inner.instance_id()
    }

    async fn list_categories(&self) -> Result<BTreeMap<String, CategorySnapshot>, ClientError> {
        self.enter("list_categories:".to_string()).await?;
        self.inner.list_categories().await
    }

    async fn list_tags(&self) -> Result<Vec<String>, ClientError> {
        self.enter("list_tags:".to_string()).await?;
        self.inner.list_tags().await
    }

    async fn list_torrents(&self) -> Result<Vec<LiveTorrent>, ClientError> {
        self.enter("list_torrents:".to_string()).await?;
        self.inner.list_torrents().await
    }

    async fn create_category(&self, name: &str, save_path: &str) -> Result<(), ClientError> {
        self.enter(format!("create_category:{}", name)).await?;
        let result = self.inner.create_category(name, save_path).await;
        self.leave();
        result
    }

    async fn update_category(&self, name: &str, save_path: &str) -> Result<(), ClientError> {
        self.enter(format!("update_category:{}", name)).await?;
        let result = self.inner.update_category(name, save_path).await;
        self.leave();
        result
    }

    async fn delete_category(&self, name: &str) -> Result<(), ClientError> {
        self.enter(format!("delete_category:{}", name)).await?;
        let result = self.inner.delete_category(name).await;
        self.leave();
        result
    }

    async fn create_tag(&self, name: &str) -> Result<(), ClientError> {
        self.enter(format!("create_tag:{}", name)).await?;
        let result = self.inner.create_tag(name).await;
        self.leave();
        result
    }

    async fn delete_tag(&self, name: &str) -> Result<(), ClientError> {
        self.enter(format!("delete_tag:{}", name)).await?;
        let result = self.inner.delete_tag(name).await;
        self.leave();
        result
    }

    async fn add_torrent(&self, item: &ManifestItem, flags: BehaviorFlags) -> Result<(), ClientError> {
        self.enter(format!("add_torrent:{}", item.hash)).await?;
        let result = self.inner.add_torrent(item, flags).await;
        self.leave();
        result
    }

    async fn update_torrent(
        &self,
        hash: &str,
        changes: &[Change],
    ) -> Result<TorrentUpdateReport, ClientError> {
        self.enter(format!("update_torrent:{}", hash)).await?;
        let result = self.inner.update_torrent(hash, changes).await;
        self.leave();
        result
    }

    async fn delete_torrent(&self, hash: &str) -> Result<(), ClientError> {
        self.enter(format!("delete_torrent:{}", hash)).await?;
        let result = self.inner.delete_torrent(hash).await;
        self.leave();
        result
    }
}

/// Service over a memory store holding [`manifest`] as `RUN_ID`
#[allow(dead_code)]
pub fn service(client: Arc<RecordingClient>, settings: RestoreSettings) -> RestoreService {
    // Tests run in parallel on the same instance id; keep their locks apart
    process_wide_service(client, settings).with_locks(InstanceLocks::new())
}

/// Service over the process-wide lock registry
#[allow(dead_code)]
pub fn process_wide_service(
    client: Arc<RecordingClient>,
    settings: RestoreSettings,
) -> RestoreService {
    let store = MemorySnapshotStore::new().with_manifest(RUN_ID, manifest());
    RestoreService::new(
        Arc::new(store),
        client,
        Arc::new(FixedCapabilities::default()),
        settings,
    )
}
