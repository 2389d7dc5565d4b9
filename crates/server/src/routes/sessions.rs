use axum::{
    extract::{Path, Query, State},
    Json,
};
use playback_api_types::{UploadQuery, UploadResponse};
use playback_core::Session;
use playback_store::SessionStore;
use playback_summary::{summarize_session, Summarizer};
use serde_json::Value;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiErr;

/// `meta` key under which an uploaded session's summary is attached.
pub const META_SUMMARY: &str = "summary";

// ---------------------------------------------------------------------------
// Upload session
// ---------------------------------------------------------------------------

/// POST /api/sessions: store a session document and return its id.
///
/// `?summarize=1` additionally summarizes the session in the background and
/// attaches the result as `meta.summary` once it arrives.
pub async fn upload_session(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    Json(body): Json<Value>,
) -> Result<Json<UploadResponse>, ApiErr> {
    if !body.get("steps").is_some_and(Value::is_array) {
        return Err(ApiErr::bad_request("Missing steps[]"));
    }

    // Missing or null title/createdAt/meta take their defaults; unknown
    // fields are kept as-is.
    let session: Session = serde_json::from_value(body)
        .map_err(|e| ApiErr::bad_request(format!("Invalid session: {e}")))?;

    let summary_source = query.wants_summary().then(|| session.clone());
    let stored = state.store.put(session);
    tracing::info!(
        session_id = %stored.id,
        sessions = state.store.len(),
        "stored session"
    );

    if let Some(session) = summary_source {
        match &state.summarizer {
            Some(summarizer) => spawn_summary(
                state.store.clone(),
                Arc::clone(summarizer),
                stored.id.clone(),
                session,
            ),
            None => tracing::debug!(
                session_id = %stored.id,
                "summary requested but no provider is configured"
            ),
        }
    }

    Ok(Json(UploadResponse {
        session_id: stored.id,
        expires_in: stored.ttl.as_secs(),
    }))
}

fn spawn_summary(
    store: SessionStore,
    summarizer: Arc<dyn Summarizer>,
    session_id: String,
    session: Session,
) {
    tokio::spawn(async move {
        match summarize_session(summarizer.as_ref(), &session).await {
            Ok(summary) => {
                if store.annotate(&session_id, META_SUMMARY, Value::String(summary)) {
                    tracing::debug!(session_id = %session_id, "attached summary");
                } else {
                    tracing::debug!(
                        session_id = %session_id,
                        "session expired before its summary arrived"
                    );
                }
            }
            Err(e) => tracing::warn!(session_id = %session_id, "summary failed: {e}"),
        }
    });
}

// ---------------------------------------------------------------------------
// Get session
// ---------------------------------------------------------------------------

/// GET /api/sessions/{id}: a stored session, or 404 once expired or evicted.
pub async fn get_session(
    State(store): State<SessionStore>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiErr> {
    store
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiErr::not_found("Not found"))
}
