use invalidator_engine::{ApiCacheInvalidator, LocalCacheInvalidator, UnifiedInvalidatorFactory};
use purge::CacheManager;
use shared::config::Config;
use std::sync::Arc;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub cache_manager: CacheManager,
    /// The in-process cache behind the LOCAL target
    pub local_cache: Arc<LocalCacheInvalidator>,
    /// Tombstones consulted by the upstream API response cache
    pub api_cache: Arc<ApiCacheInvalidator>,
}

impl AppState {
    pub fn new(config: &Config) -> shared::Result<Self> {
        let factory = UnifiedInvalidatorFactory::new();
        let cache_manager = CacheManager::from_config(config, &factory)?;

        Ok(Self {
            cache_manager,
            local_cache: factory.local(),
            api_cache: factory.api(),
        })
    }
}
