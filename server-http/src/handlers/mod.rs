pub mod cache;

pub use cache::health::{cache_stats, health_check, invalidation_history};
pub use cache::invalidate::{clear_all, invalidate_cache};
pub use cache::webhook::webhook_invalidation;
