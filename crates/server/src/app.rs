use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use playback_store::SessionStore;
use playback_summary::Summarizer;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::routes;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    /// `None` when no summarization provider is configured
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/sessions", post(routes::sessions::upload_session))
        .route("/sessions/{id}", get(routes::sessions::get_session))
        .layer(DefaultBodyLimit::max(config.json_limit));

    let mut app = Router::new()
        .nest("/api", api)
        .route("/health", get(routes::health::health));

    // Serve the playback UI if present; unknown paths such as /session/{id}
    // get index.html so the client can route them.
    if config.web_dir.exists() {
        tracing::info!("serving static files from {}", config.web_dir.display());
        let index_html = config.web_dir.join("index.html");
        app = app.fallback_service(
            ServeDir::new(&config.web_dir).fallback(ServeFile::new(index_html)),
        );
    }

    app.layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
