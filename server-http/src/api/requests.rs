use purge::{CacheTarget, InvalidationRequest};
use serde::Deserialize;
use shared::{Error, Result};

const DEFAULT_HISTORY_LIMIT: i64 = 50;

// === Invalidation Models ===

#[derive(Debug, Deserialize)]
pub struct InvalidateCacheRequest {
    pub targets: Vec<String>,
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub patterns: Option<Vec<String>>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl InvalidateCacheRequest {
    /// Validate target names and build the domain request
    pub fn into_domain(self, initiated_by: String) -> Result<InvalidationRequest> {
        if self.targets.is_empty() {
            return Err(Error::Validation("At least one target is required".into()));
        }
        let targets = CacheTarget::parse_all(&self.targets)?;

        let mut request = InvalidationRequest::new(targets)
            .with_force(self.force)
            .initiated_by(initiated_by);
        request.keys = self.keys;
        request.patterns = self.patterns;
        request.reason = self.reason;
        request.webhook_url = self.webhook_url;
        Ok(request)
    }
}

// === Query Models ===

#[derive(Debug, Deserialize)]
pub struct ClearAllQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

impl HistoryQuery {
    /// Requested limit clamped to [0, 200]
    pub fn clamped_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(0, purge::planes::control::MAX_HISTORY_QUERY as i64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_domain_validates_targets() {
        let req: InvalidateCacheRequest =
            serde_json::from_str(r#"{"targets":["local","API"],"keys":["a"]}"#).unwrap();
        let request = req.into_domain("api:***".into()).unwrap();
        assert_eq!(request.targets.len(), 2);
        assert_eq!(request.keys(), ["a".to_string()]);
        assert!(!request.force);

        let req: InvalidateCacheRequest =
            serde_json::from_str(r#"{"targets":["local","bogus"]}"#).unwrap();
        assert!(matches!(req.into_domain(String::new()), Err(Error::Validation(_))));

        let req: InvalidateCacheRequest = serde_json::from_str(r#"{"targets":[]}"#).unwrap();
        assert!(matches!(req.into_domain(String::new()), Err(Error::Validation(_))));
    }

    #[test]
    fn test_history_limit_is_clamped() {
        let q = |limit| HistoryQuery { limit };
        assert_eq!(q(None).clamped_limit(), 50);
        assert_eq!(q(Some(-5)).clamped_limit(), 0);
        assert_eq!(q(Some(10)).clamped_limit(), 10);
        assert_eq!(q(Some(10_000)).clamped_limit(), 200);
    }
}
