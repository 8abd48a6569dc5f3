use crate::api::{HealthResponse, HistoryQuery, HistoryResponse};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use purge::planes::control::overall_health;
use purge::CacheStats;

/// GET /cache/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let targets = state.cache_manager.health_check().await;
    let overall_health = overall_health(&targets);

    Json(HealthResponse {
        targets,
        overall_health,
    })
}

/// GET /cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache_manager.get_cache_stats().await)
}

/// GET /cache/history?limit=N
pub async fn invalidation_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let limit = query.clamped_limit();
    let history = state.cache_manager.get_invalidation_history(limit).await;

    Json(HistoryResponse {
        count: history.len(),
        history,
        limit,
    })
}
