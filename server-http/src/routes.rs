use crate::handlers;
use crate::middleware::require_api_key;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// Build and configure the application router.
///
/// Trailing slashes are trimmed before routing, so the router is wrapped
/// rather than layered. Serve it with `ServiceExt::<Request>::into_make_service`.
pub fn build_router(state: AppState) -> NormalizePath<Router> {
    // API-key protected management routes
    let protected = Router::new()
        .route("/cache/invalidate", post(handlers::invalidate_cache))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let router = Router::new()
        .merge(protected)
        // Signature-authenticated inbound webhook
        .route("/cache/webhook", post(handlers::webhook_invalidation))
        // Confirmation is checked before the API key
        .route("/cache/clear-all", delete(handlers::clear_all))
        // Read-only observability
        .route("/cache/health", get(handlers::health_check))
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/cache/history", get(handlers::invalidation_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    NormalizePath::trim_trailing_slash(router)
}
