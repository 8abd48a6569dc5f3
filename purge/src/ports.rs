use crate::domain::CacheTarget;
use async_trait::async_trait;
use shared::config::Config;
use shared::Result;
use std::sync::Arc;

// Ports are the pluggable extension points for concrete cache backends

/// Capability every cache target implements.
///
/// `invalidate` returns `Ok(true)` when the target accepted the invalidation,
/// `Ok(false)` when it declined or the remote side reported failure, and `Err`
/// for runtime failures. Implementations must not panic; the manager isolates
/// panics anyway and records them as a failed target.
#[async_trait]
pub trait CacheInvalidator: Send + Sync + 'static {
    /// Which configured target this invalidator serves
    fn target(&self) -> CacheTarget;

    /// Invalidate explicit keys and/or glob patterns. `force` drops everything.
    async fn invalidate(&self, keys: &[String], patterns: &[String], force: bool) -> Result<bool>;

    /// Cheap liveness probe. Any failure is reported as `false`.
    async fn health_check(&self) -> bool;
}

/// Port for building the target registry from static configuration
pub trait InvalidatorFactory: Send + Sync + 'static {
    /// Build an invalidator for every target the configuration enables
    fn create_from_config(&self, config: &Config) -> Result<Vec<Arc<dyn CacheInvalidator>>>;

    /// The LOCAL invalidator used when the configuration did not produce one
    fn create_fallback(&self) -> Arc<dyn CacheInvalidator>;
}
