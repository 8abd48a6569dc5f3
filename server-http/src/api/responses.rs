use purge::{CacheTarget, InvalidationResult};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: InvalidationResult,
}

impl From<InvalidationResult> for InvalidateResponse {
    fn from(result: InvalidationResult) -> Self {
        Self {
            success: result.is_success(),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub webhook_event: String,
    #[serde(flatten)]
    pub result: InvalidationResult,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub targets: BTreeMap<CacheTarget, bool>,
    pub overall_health: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<InvalidationResult>,
    pub count: usize,
    pub limit: usize,
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
