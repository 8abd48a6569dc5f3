use crate::api::WebhookResponse;
use crate::error::ApiError;
use crate::middleware::SIGNATURE_HEADER;
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use bytes::Bytes;
use purge::WebhookPayload;
use tracing::{info, warn};

/// POST /cache/webhook
///
/// Authenticated by an HMAC-SHA256 signature of the raw body instead of an API
/// key. Verification is skipped entirely when no secret is configured.
pub async fn webhook_invalidation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if !state.cache_manager.verify_webhook_signature(&body, signature) {
        warn!("Rejected webhook with invalid signature ({} bytes)", body.len());
        return Err(ApiError::unauthorized("Invalid webhook signature"));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(ApiError::from_json)?;
    let webhook_event = payload.event.clone();
    info!("WEBHOOK: event={}", webhook_event);

    let result = state
        .cache_manager
        .process_webhook_invalidation(payload)
        .await?;

    Ok(Json(WebhookResponse {
        success: result.is_success(),
        webhook_event,
        result,
    }))
}
