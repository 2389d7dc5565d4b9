use axum::{extract::State, Json};
use playback_api_types::HealthResponse;
use playback_store::SessionStore;

/// GET /health: liveness plus store occupancy.
pub async fn health(State(store): State<SessionStore>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        sessions: store.len(),
        ttl_seconds: store.config().ttl.as_secs(),
    })
}
