use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Lower bound applied to the `keys_invalidated` estimate of a forced flush
pub const FORCE_KEYS_ESTIMATE: u64 = 100;

const REQUEST_ID_LEN: usize = 12;

/// A configured cache backend that is invalidated independently
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CacheTarget {
    Cdn,
    Local,
    Api,
    Redis,
    Memory,
    Database,
}

impl CacheTarget {
    /// Parse a list of wire names, failing on the first unknown one
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<BTreeSet<CacheTarget>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                CacheTarget::from_str(name.trim())
                    .map_err(|_| Error::Validation(format!("Unknown cache target: '{}'", name)))
            })
            .collect()
    }
}

/// One invalidation call. Created per request and never stored.
#[derive(Clone, Debug, Serialize)]
pub struct InvalidationRequest {
    pub targets: BTreeSet<CacheTarget>,
    pub keys: Option<Vec<String>>,
    pub patterns: Option<Vec<String>>,
    pub force: bool,
    pub reason: Option<String>,
    pub initiated_by: Option<String>,
    pub webhook_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl InvalidationRequest {
    pub fn new(targets: impl IntoIterator<Item = CacheTarget>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            keys: None,
            patterns: None,
            force: false,
            reason: None,
            initiated_by: None,
            webhook_url: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = Some(patterns);
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn initiated_by(mut self, who: impl Into<String>) -> Self {
        self.initiated_by = Some(who.into());
        self
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn keys(&self) -> &[String] {
        self.keys.as_deref().unwrap_or_default()
    }

    pub fn patterns(&self) -> &[String] {
        self.patterns.as_deref().unwrap_or_default()
    }

    /// Short, stable hash over the request content and its timestamp
    pub fn request_id(&self) -> String {
        let mut hasher = Sha256::new();
        // serialization of plain strings, sets and a timestamp cannot fail
        if let Ok(body) = serde_json::to_vec(self) {
            hasher.update(&body);
        }
        let digest = hex::encode(hasher.finalize());
        digest[..REQUEST_ID_LEN].to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvalidationStatus {
    Success,
    Partial,
    Failed,
}

impl InvalidationStatus {
    /// SUCCESS iff every entry is true, FAILED iff every entry is false (or
    /// nothing was processed), PARTIAL otherwise.
    pub fn aggregate(targets_processed: &BTreeMap<CacheTarget, bool>) -> Self {
        let succeeded = targets_processed.values().filter(|ok| **ok).count();
        match succeeded {
            0 => InvalidationStatus::Failed,
            n if n == targets_processed.len() => InvalidationStatus::Success,
            _ => InvalidationStatus::Partial,
        }
    }
}

/// Outcome of one invalidation request, recorded once into history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvalidationResult {
    pub request_id: String,
    pub status: InvalidationStatus,
    pub targets_processed: BTreeMap<CacheTarget, bool>,
    /// Heuristic estimate, not an exact count
    pub keys_invalidated: u64,
    pub errors: Vec<String>,
    pub duration_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl InvalidationResult {
    pub fn is_success(&self) -> bool {
        self.status == InvalidationStatus::Success
    }

    /// `len(keys) + len(patterns)` per successful target, floored at
    /// [`FORCE_KEYS_ESTIMATE`] for a forced flush that reached at least one target.
    pub fn estimate_keys_invalidated(
        request: &InvalidationRequest,
        targets_processed: &BTreeMap<CacheTarget, bool>,
    ) -> u64 {
        let per_target = (request.keys().len() + request.patterns().len()) as u64;
        let succeeded = targets_processed.values().filter(|ok| **ok).count() as u64;
        let estimate = per_target * succeeded;

        if request.force && succeeded > 0 {
            estimate.max(FORCE_KEYS_ESTIMATE)
        } else {
            estimate
        }
    }
}

/// Inbound event from an external system
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WebhookPayload {
    pub event: String,
    #[serde(default)]
    pub targets: Option<Vec<String>>,
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub patterns: Option<Vec<String>>,
    #[serde(default)]
    pub force: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl WebhookPayload {
    /// Map the event onto a request; defaults to LOCAL and a reason naming the event
    pub fn into_request(self) -> Result<InvalidationRequest> {
        let targets = match self.targets.as_deref() {
            Some(names) if !names.is_empty() => CacheTarget::parse_all(names)?,
            _ => BTreeSet::from([CacheTarget::Local]),
        };

        let reason = self
            .reason
            .unwrap_or_else(|| format!("Webhook: {}", self.event));

        let mut request = InvalidationRequest::new(targets)
            .with_force(self.force.unwrap_or(false))
            .with_reason(reason)
            .initiated_by("webhook");
        request.keys = self.keys;
        request.patterns = self.patterns;
        request.webhook_url = self.webhook_url;
        Ok(request)
    }
}
