#![deny(clippy::all)]

pub mod auth;
pub mod domain;
pub mod events;
pub mod notify;
pub mod pattern;
pub mod planes;
pub mod ports;

pub use domain::{
    CacheTarget, InvalidationRequest, InvalidationResult, InvalidationStatus, WebhookPayload,
};
pub use planes::control::{CacheManager, CacheStats, DEGRADED, HEALTHY};
pub use ports::{CacheInvalidator, InvalidatorFactory};
