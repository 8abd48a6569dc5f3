use crate::auth::WebhookSigner;
use crate::domain::InvalidationResult;
use crate::events::InvalidationEvent;
use reqwest::Client;
use shared::{Error, Result};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Best-effort completion callbacks.
///
/// Sends run on detached tasks whose output is `()`: failures end in the log and
/// never reach the caller that produced the result.
#[derive(Clone)]
pub struct WebhookNotifier {
    http_client: Client,
    signer: WebhookSigner,
    tasks: TaskTracker,
}

impl WebhookNotifier {
    pub fn new(timeout: Duration, signer: WebhookSigner, tasks: TaskTracker) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build notification client: {}", e)))?;

        Ok(Self {
            http_client,
            signer,
            tasks,
        })
    }

    /// Fire and forget. The handle is only useful to tests that want to wait.
    pub fn notify_detached(&self, url: String, result: InvalidationResult) -> JoinHandle<()> {
        let notifier = self.clone();
        self.tasks.spawn(async move {
            let event = InvalidationEvent::completed(result);
            match notifier.send(&url, &event).await {
                Ok(()) => debug!(
                    "Notified {} about request {}",
                    url,
                    event.request_id()
                ),
                Err(e) => warn!(
                    "Webhook notification for request {} to {} dropped: {}",
                    event.request_id(),
                    url,
                    e
                ),
            }
        })
    }

    async fn send(&self, url: &str, event: &InvalidationEvent) -> Result<()> {
        let body =
            serde_json::to_vec(event).map_err(|e| Error::Notification(e.to_string()))?;

        let mut request = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json");

        if let Some(signature) = self.signer.sign(&body) {
            request = request.header(SIGNATURE_HEADER, format!("sha256={}", signature));
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Notification(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Notification(format!(
                "receiver answered {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InvalidationStatus;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_result() -> InvalidationResult {
        InvalidationResult {
            request_id: "feedfacecafe".into(),
            status: InvalidationStatus::Success,
            targets_processed: BTreeMap::new(),
            keys_invalidated: 2,
            errors: Vec::new(),
            duration_ms: 0.4,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_notification_is_posted_and_signed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header_exists(SIGNATURE_HEADER))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(
            Duration::from_secs(2),
            WebhookSigner::new(Some("s".into())),
            TaskTracker::new(),
        )
        .unwrap();
        notifier
            .notify_detached(format!("{}/hook", server.uri()), sample_result())
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["event"], "cache_invalidation_completed");
        assert_eq!(body["result"]["request_id"], "feedfacecafe");
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(
            Duration::from_secs(2),
            WebhookSigner::new(None),
            TaskTracker::new(),
        )
        .unwrap();

        // a failing receiver and an unreachable host both finish the task cleanly
        notifier
            .notify_detached(server.uri(), sample_result())
            .await
            .unwrap();
        notifier
            .notify_detached("http://127.0.0.1:1/unreachable".into(), sample_result())
            .await
            .unwrap();
    }
}
