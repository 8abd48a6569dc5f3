use async_trait::async_trait;
use purge::pattern::glob_match;
use purge::{CacheInvalidator, CacheTarget};
use shared::Result;
use std::collections::HashSet;
use std::fmt::Debug;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const EVERYTHING: &str = "*";
pub const DEFAULT_MAX_PATH_TOMBSTONES: usize = 10_000;

#[derive(Debug, Default)]
struct Tombstones {
    paths: HashSet<String>,
    patterns: HashSet<String>,
}

impl Tombstones {
    // a single catch-all supersedes every other tombstone
    fn mark_everything(&mut self) {
        self.paths.clear();
        self.patterns.clear();
        self.patterns.insert(EVERYTHING.to_string());
    }
}

/// Tombstones for the upstream API response cache.
///
/// Nothing is deleted here; the response cache asks [`is_invalidated`] before
/// serving and calls [`clear_tombstones`] once it has refetched. Exact paths
/// are bounded: past the limit everything is marked stale instead.
///
/// [`is_invalidated`]: ApiCacheInvalidator::is_invalidated
/// [`clear_tombstones`]: ApiCacheInvalidator::clear_tombstones
pub struct ApiCacheInvalidator {
    tombstones: Mutex<Tombstones>,
    max_paths: usize,
}

impl Default for ApiCacheInvalidator {
    fn default() -> Self {
        Self::with_path_limit(DEFAULT_MAX_PATH_TOMBSTONES)
    }
}

impl ApiCacheInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_limit(max_paths: usize) -> Self {
        Self {
            tombstones: Mutex::new(Tombstones::default()),
            max_paths: max_paths.max(1),
        }
    }

    /// Whether a cached response for `path` must be treated as stale
    pub async fn is_invalidated(&self, path: &str) -> bool {
        let tombstones = self.tombstones.lock().await;
        tombstones.paths.contains(path)
            || tombstones.patterns.contains(EVERYTHING)
            || tombstones.patterns.iter().any(|p| glob_match(p, path))
    }

    /// Number of path and pattern tombstones currently held
    pub async fn tombstone_count(&self) -> usize {
        let tombstones = self.tombstones.lock().await;
        tombstones.paths.len() + tombstones.patterns.len()
    }

    /// Drop all tombstones once the upstream cache has refreshed
    pub async fn clear_tombstones(&self) {
        let mut tombstones = self.tombstones.lock().await;
        tombstones.paths.clear();
        tombstones.patterns.clear();
    }
}

#[async_trait]
impl CacheInvalidator for ApiCacheInvalidator {
    fn target(&self) -> CacheTarget {
        CacheTarget::Api
    }

    async fn invalidate(&self, keys: &[String], patterns: &[String], force: bool) -> Result<bool> {
        let mut tombstones = self.tombstones.lock().await;

        if force || tombstones.patterns.contains(EVERYTHING) {
            tombstones.mark_everything();
            debug!("API cache marked fully stale");
            return Ok(true);
        }

        tombstones.paths.extend(keys.iter().cloned());
        tombstones.patterns.extend(patterns.iter().cloned());

        // exact paths already covered by a pattern add nothing
        let Tombstones { paths, patterns } = &mut *tombstones;
        paths.retain(|path| !patterns.iter().any(|p| glob_match(p, path)));

        if paths.len() > self.max_paths {
            warn!(
                "API cache holds {} path tombstones (limit {}), marking everything stale",
                paths.len(),
                self.max_paths
            );
            tombstones.mark_everything();
            return Ok(true);
        }

        debug!(
            "API cache tombstones: {} paths, {} patterns",
            paths.len(),
            patterns.len()
        );
        Ok(true)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

impl Debug for ApiCacheInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCacheInvalidator")
            .field("tombstones", &"<Mutex<Tombstones>>")
            .field("max_paths", &self.max_paths)
            .finish()
    }
}
