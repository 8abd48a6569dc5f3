use async_trait::async_trait;
use bytes::Bytes;
use purge::pattern::matches_any;
use purge::{CacheInvalidator, CacheTarget};
use shared::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use tokio::sync::Mutex;
use tracing::debug;

/// In-process key/value cache.
///
/// All mutation goes through one lock because concurrent requests may target
/// LOCAL at the same time.
#[derive(Default)]
pub struct LocalCacheInvalidator {
    entries: Mutex<HashMap<String, Bytes>>,
}

impl LocalCacheInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.entries.lock().await.insert(key.into(), value.into());
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    pub async fn size(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Sorted snapshot of the current keys
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl CacheInvalidator for LocalCacheInvalidator {
    fn target(&self) -> CacheTarget {
        CacheTarget::Local
    }

    async fn invalidate(&self, keys: &[String], patterns: &[String], force: bool) -> Result<bool> {
        let mut entries = self.entries.lock().await;

        if force {
            let dropped = entries.len();
            entries.clear();
            debug!("LOCAL flushed {} entries", dropped);
            return Ok(true);
        }

        let before = entries.len();
        for key in keys {
            // absent keys are fine
            entries.remove(key);
        }
        if !patterns.is_empty() {
            entries.retain(|key, _| !matches_any(patterns, key));
        }

        debug!("LOCAL removed {} entries", before - entries.len());
        Ok(true)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

impl Debug for LocalCacheInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCacheInvalidator")
            .field("entries", &"<Mutex<HashMap>>")
            .finish()
    }
}
