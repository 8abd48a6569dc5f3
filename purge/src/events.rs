use crate::domain::InvalidationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outbound notifications sent to a caller-supplied webhook URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InvalidationEvent {
    CacheInvalidationCompleted(InvalidationCompletedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidationCompletedEvent {
    pub result: InvalidationResult,
    pub timestamp: DateTime<Utc>,
}

impl InvalidationEvent {
    pub fn completed(result: InvalidationResult) -> Self {
        InvalidationEvent::CacheInvalidationCompleted(InvalidationCompletedEvent {
            result,
            timestamp: Utc::now(),
        })
    }

    pub fn request_id(&self) -> &str {
        match self {
            InvalidationEvent::CacheInvalidationCompleted(e) => &e.result.request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InvalidationStatus;
    use std::collections::BTreeMap;

    #[test]
    fn test_completed_event_wire_shape() {
        let result = InvalidationResult {
            request_id: "0123456789ab".into(),
            status: InvalidationStatus::Success,
            targets_processed: BTreeMap::new(),
            keys_invalidated: 0,
            errors: Vec::new(),
            duration_ms: 0.2,
            timestamp: Utc::now(),
        };
        let event = InvalidationEvent::completed(result);
        assert_eq!(event.request_id(), "0123456789ab");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "cache_invalidation_completed");
        assert_eq!(json["result"]["request_id"], "0123456789ab");
        assert!(json["timestamp"].is_string());
    }
}
