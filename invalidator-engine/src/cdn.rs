use async_trait::async_trait;
use purge::{CacheInvalidator, CacheTarget};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::config::CdnConfig;
use shared::{Error, Result};
use std::fmt::Debug;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum PurgeBody<'a> {
    Everything { purge_everything: bool },
    Files { files: Vec<&'a str> },
}

#[derive(Debug, Deserialize)]
struct VendorResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Reference CDN integration (Cloudflare-style zone purge API).
///
/// Stateless: every call is one authenticated request bounded by the
/// configured timeout.
pub struct CdnInvalidator {
    http_client: Client,
    config: CdnConfig,
}

impl CdnInvalidator {
    pub fn new(config: CdnConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build CDN client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn zone_url(&self) -> String {
        format!(
            "{}/zones/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.zone_id
        )
    }

    fn purge_body<'a>(keys: &'a [String], patterns: &'a [String], force: bool) -> PurgeBody<'a> {
        if force || (keys.is_empty() && patterns.is_empty()) {
            PurgeBody::Everything {
                purge_everything: true,
            }
        } else {
            PurgeBody::Files {
                files: keys.iter().chain(patterns).map(String::as_str).collect(),
            }
        }
    }
}

#[async_trait]
impl CacheInvalidator for CdnInvalidator {
    fn target(&self) -> CacheTarget {
        CacheTarget::Cdn
    }

    async fn invalidate(&self, keys: &[String], patterns: &[String], force: bool) -> Result<bool> {
        let body = Self::purge_body(keys, patterns, force);
        debug!("CDN purge request: {:?}", body);

        let response = self
            .http_client
            .post(format!("{}/purge_cache", self.zone_url()))
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "request failed" };
                Error::invalidator(CacheTarget::Cdn.to_string(), format!("{}: {}", reason, e))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("CDN purge answered HTTP {}", status);
            return Ok(false);
        }

        let parsed: VendorResponse = response.json().await.map_err(|e| {
            Error::invalidator(CacheTarget::Cdn.to_string(), format!("unreadable response: {}", e))
        })?;

        if !parsed.success {
            warn!("CDN purge rejected by vendor: {:?}", parsed.errors);
        }
        Ok(parsed.success)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(self.zone_url())
            .bearer_auth(&self.config.api_token)
            .send()
            .await
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                warn!("CDN health check failed: {}", e);
                false
            }
        }
    }
}

impl Debug for CdnInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdnInvalidator")
            .field("zone_id", &self.config.zone_id)
            .field("base_url", &self.config.base_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cdn_for(server: &MockServer, timeout: Duration) -> CdnInvalidator {
        CdnInvalidator::new(CdnConfig {
            zone_id: "zone-1".into(),
            api_token: "token-1".into(),
            base_url: server.uri(),
            timeout,
        })
        .unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_purge_everything_without_keys() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/zones/zone-1/purge_cache"))
            .and(header("authorization", "Bearer token-1"))
            .and(body_json(json!({"purge_everything": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let cdn = cdn_for(&server, Duration::from_secs(5));
        assert!(cdn.invalidate(&[], &[], false).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_named_files() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/zones/zone-1/purge_cache"))
            .and(body_json(json!({"files": ["/a.css", "/img/*"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let cdn = cdn_for(&server, Duration::from_secs(5));
        let ok = cdn
            .invalidate(&strings(&["/a.css"]), &strings(&["/img/*"]), false)
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_vendor_failure_flag_is_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": false, "errors": [{"code": 1012, "message": "bad zone"}]}),
            ))
            .mount(&server)
            .await;

        let cdn = cdn_for(&server, Duration::from_secs(5));
        assert!(!cdn.invalidate(&[], &[], true).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_200_is_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let cdn = cdn_for(&server, Duration::from_secs(5));
        assert!(!cdn.invalidate(&[], &[], true).await.unwrap());
    }

    #[tokio::test]
    async fn test_timeout_is_an_error_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let cdn = cdn_for(&server, Duration::from_millis(50));
        let err = cdn.invalidate(&[], &[], true).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones/zone-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let cdn = cdn_for(&server, Duration::from_secs(5));
        assert!(cdn.health_check().await);

        let unreachable = CdnInvalidator::new(CdnConfig {
            zone_id: "zone-1".into(),
            api_token: "token-1".into(),
            base_url: "http://127.0.0.1:1".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert!(!unreachable.health_check().await);
    }
}
