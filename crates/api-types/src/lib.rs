//! Shared API types for the playback server.
//!
//! The server (Axum) and the CLI uploader both import these types, so the
//! request/response bodies have a single definition.

use serde::{Deserialize, Serialize};

pub use playback_core::{Session, Step, ToolCall, ToolStatus};

/// Query string accepted by `POST /api/sessions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadQuery {
    /// `1` or `true` requests a background summary of the uploaded session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarize: Option<String>,
}

impl UploadQuery {
    pub fn wants_summary(&self) -> bool {
        matches!(
            self.summarize.as_deref().map(str::trim),
            Some("1") | Some("true") | Some("yes")
        )
    }
}

/// Response of `POST /api/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    /// Seconds until the stored session expires
    pub expires_in: u64,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub sessions: usize,
    pub ttl_seconds: u64,
}

/// Body of every error response: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Browser path at which a stored session is played back.
pub fn session_page_path(session_id: &str) -> String {
    format!("/session/{session_id}")
}
