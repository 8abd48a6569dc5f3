use crate::domain::{InvalidationResult, WebhookPayload};
use crate::planes::control::CacheManager;
use shared::Result;
use tracing::info;

impl CacheManager {
    /// Turn an external event into an invalidation and run it.
    ///
    /// Unknown target names fail with `Error::Validation` before anything is
    /// dispatched; target failures are reported inside the result.
    pub async fn process_webhook_invalidation(
        &self,
        payload: WebhookPayload,
    ) -> Result<InvalidationResult> {
        let event = payload.event.clone();
        let request = payload.into_request()?;

        info!(
            "Webhook event '{}' mapped to targets {:?}",
            event, request.targets
        );

        Ok(self.invalidate_cache(request).await)
    }
}
