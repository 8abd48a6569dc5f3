use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use purge::auth::redact;
use tracing::warn;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Identity recorded as `initiated_by` for API-key callers
#[derive(Clone, Debug)]
pub struct ApiCaller(pub String);

/// Extract the API key from the X-API-Key header
fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

/// Check the X-API-Key header against the configured keys
pub fn authorize_api_key(state: &AppState, headers: &HeaderMap) -> Result<ApiCaller, ApiError> {
    let Some(key) = extract_api_key(headers) else {
        warn!("Rejected request without X-API-Key header");
        return Err(ApiError::unauthorized("Missing API key"));
    };

    if !state.cache_manager.verify_api_key(key) {
        warn!("Rejected invalid API key {}", redact(key));
        return Err(ApiError::unauthorized("Invalid API key"));
    }

    Ok(ApiCaller(format!("api:{}", redact(key))))
}

/// Authentication middleware
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = authorize_api_key(&state, request.headers())?;

    // Attach caller to request extensions
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
