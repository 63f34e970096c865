//! Per-instance execution locks
//!
//! At most one execute call runs against a managed instance at a time.
//! Different instances never contend. Services share the process-wide
//! registry unless given their own.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per instance id
#[derive(Debug, Clone, Default)]
pub struct InstanceLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl InstanceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shared by every service in the process
    pub fn global() -> Self {
        static GLOBAL: OnceLock<InstanceLocks> = OnceLock::new();
        GLOBAL.get_or_init(InstanceLocks::new).clone()
    }

    /// The mutex guarding `instance_id`, created on first use
    pub fn lock_for(&self, instance_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            locks
                .entry(instance_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    /// Wait until `instance_id` is free and hold it until the guard drops
    pub async fn acquire(&self, instance_id: &str) -> OwnedMutexGuard<()> {
        self.lock_for(instance_id).lock_owned().await
    }

    /// Whether an execute currently holds `instance_id`
    pub fn is_locked(&self, instance_id: &str) -> bool {
        self.lock_for(instance_id).try_lock().is_err()
    }
}
