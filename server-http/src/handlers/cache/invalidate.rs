use crate::api::{ClearAllQuery, InvalidateCacheRequest, InvalidateResponse};
use crate::error::ApiError;
use crate::middleware::authentication::ApiCaller;
use crate::middleware::authorize_api_key;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Extension, Json,
};
use bytes::Bytes;
use purge::InvalidationRequest;
use tracing::info;

/// POST /cache/invalidate
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Extension(caller): Extension<ApiCaller>,
    body: Bytes,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let req: InvalidateCacheRequest = serde_json::from_slice(&body).map_err(ApiError::from_json)?;
    let request = req.into_domain(caller.0)?;

    info!(
        "INVALIDATE: targets={:?}, initiated_by={:?}",
        request.targets, request.initiated_by
    );

    let result = state.cache_manager.invalidate_cache(request).await;
    Ok(Json(result.into()))
}

/// DELETE /cache/clear-all?confirm=true
pub async fn clear_all(
    State(state): State<AppState>,
    Query(query): Query<ClearAllQuery>,
    headers: HeaderMap,
) -> Result<Json<InvalidateResponse>, ApiError> {
    if !query.confirm {
        return Err(ApiError::BadRequest(
            "Clearing all caches requires confirm=true".into(),
        ));
    }
    let caller = authorize_api_key(&state, &headers)?;

    let targets = state.cache_manager.configured_targets();
    info!("CLEAR_ALL: targets={:?}, initiated_by={}", targets, caller.0);

    let request = InvalidationRequest::new(targets)
        .with_force(true)
        .with_reason("Clear all caches")
        .initiated_by(caller.0);

    let result = state.cache_manager.invalidate_cache(request).await;
    Ok(Json(result.into()))
}
