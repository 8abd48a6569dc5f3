pub mod api;
pub mod cdn;
pub mod local;

pub use api::ApiCacheInvalidator;
pub use cdn::CdnInvalidator;
pub use local::LocalCacheInvalidator;

use purge::{CacheInvalidator, InvalidatorFactory};
use shared::config::Config;
use shared::Result;
use std::sync::Arc;
use tracing::info;

/// Builds LOCAL, API and CDN invalidators from static configuration.
///
/// The in-process invalidators are created up front so the application can
/// keep typed handles to them (populate LOCAL, query API tombstones).
#[derive(Clone, Default)]
pub struct UnifiedInvalidatorFactory {
    local: Arc<LocalCacheInvalidator>,
    api: Arc<ApiCacheInvalidator>,
}

impl UnifiedInvalidatorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local(&self) -> Arc<LocalCacheInvalidator> {
        self.local.clone()
    }

    pub fn api(&self) -> Arc<ApiCacheInvalidator> {
        self.api.clone()
    }
}

impl InvalidatorFactory for UnifiedInvalidatorFactory {
    fn create_from_config(&self, config: &Config) -> Result<Vec<Arc<dyn CacheInvalidator>>> {
        let mut invalidators: Vec<Arc<dyn CacheInvalidator>> = Vec::new();

        if config.local_enabled {
            info!("LOCAL target enabled");
            invalidators.push(self.local.clone());
        }

        if config.api_cache_enabled {
            info!("API target enabled");
            invalidators.push(self.api.clone());
        }

        if let Some(cdn) = &config.cdn {
            info!("CDN target enabled for zone {}", cdn.zone_id);
            invalidators.push(Arc::new(CdnInvalidator::new(cdn.clone())?));
        }

        Ok(invalidators)
    }

    fn create_fallback(&self) -> Arc<dyn CacheInvalidator> {
        self.local.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purge::CacheTarget;
    use shared::config::CdnConfig;
    use std::time::Duration;

    fn targets(invalidators: &[Arc<dyn CacheInvalidator>]) -> Vec<CacheTarget> {
        invalidators.iter().map(|i| i.target()).collect()
    }

    #[test]
    fn test_default_config_builds_local_and_api() {
        let factory = UnifiedInvalidatorFactory::new();
        let built = factory.create_from_config(&Config::default()).unwrap();
        assert_eq!(targets(&built), vec![CacheTarget::Local, CacheTarget::Api]);
    }

    #[test]
    fn test_cdn_is_built_when_configured() {
        let config = Config {
            api_cache_enabled: false,
            cdn: Some(CdnConfig {
                zone_id: "z".into(),
                api_token: "t".into(),
                base_url: "http://localhost:9".into(),
                timeout: Duration::from_secs(1),
            }),
            ..Config::default()
        };
        let built = UnifiedInvalidatorFactory::new()
            .create_from_config(&config)
            .unwrap();
        assert_eq!(targets(&built), vec![CacheTarget::Local, CacheTarget::Cdn]);
    }

    #[tokio::test]
    async fn test_fallback_shares_the_local_handle() {
        let factory = UnifiedInvalidatorFactory::new();
        factory.local().insert("k", "v").await;

        let fallback = factory.create_fallback();
        assert_eq!(fallback.target(), CacheTarget::Local);
        fallback.invalidate(&[], &[], true).await.unwrap();
        assert_eq!(factory.local().size().await, 0);
    }
}
