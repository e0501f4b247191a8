//! Health check handler.

use axum::Json;
use axum::extract::State;

use dochub_core::traits::cache::CacheProvider;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Always answers while the process is up; dependency state is reported
/// in the body.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_ok = state.cache.health_check().await.unwrap_or(false);
    let storage_ok = state.storage.health_check().await.unwrap_or(false);

    let label = |ok: bool| if ok { "connected" } else { "unavailable" }.to_string();

    Json(HealthResponse {
        status: if cache_ok && storage_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: label(cache_ok),
        storage: label(storage_ok),
    })
}
