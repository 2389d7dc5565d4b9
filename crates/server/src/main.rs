mod app;
mod config;
mod error;
mod routes;

use anyhow::Context;
use playback_summary::{LlmSummarizer, Summarizer, SummaryError};
use std::sync::Arc;

use app::AppState;
use config::ServerConfig;
use playback_store::SessionStore;

fn load_summarizer() -> Option<Arc<dyn Summarizer>> {
    match LlmSummarizer::from_env() {
        Ok(summarizer) => {
            tracing::info!(
                "summaries enabled via {}",
                summarizer.provider().name()
            );
            Some(Arc::new(summarizer))
        }
        Err(SummaryError::Unavailable) => {
            tracing::info!("no summarization provider configured; summaries disabled");
            None
        }
        Err(e) => {
            tracing::warn!("summaries disabled: {e}");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playback_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        ttl_seconds = config.store.ttl.as_secs(),
        max_sessions = config.store.max_sessions,
        "session store configured"
    );

    let store = SessionStore::new(config.store.clone());
    let sweeper = store.spawn_sweeper();

    let state = AppState {
        store,
        summarizer: load_summarizer(),
    };
    let app = app::build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    tracing::info!("Playback server running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    sweeper.shutdown().await;
    Ok(())
}

/// Wait for SIGTERM or Ctrl+C
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl+C"),
            },
            Err(e) => {
                tracing::warn!("Failed to register SIGTERM handler: {e}");
                ctrl_c_or_forever().await;
            }
        }
    }
    #[cfg(not(unix))]
    ctrl_c_or_forever().await;
}

async fn ctrl_c_or_forever() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C"),
        Err(e) => {
            tracing::warn!("Failed to register Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}
