pub mod cache_manager;
pub mod history;

pub use cache_manager::{CacheManager, CacheStats};
pub use history::{InvalidationHistory, MAX_HISTORY_QUERY};

use crate::domain::CacheTarget;
use std::collections::BTreeMap;

pub const HEALTHY: &str = "healthy";
pub const DEGRADED: &str = "degraded";

/// `healthy` iff every configured target reports healthy
pub fn overall_health(status: &BTreeMap<CacheTarget, bool>) -> &'static str {
    if status.values().all(|ok| *ok) {
        HEALTHY
    } else {
        DEGRADED
    }
}
