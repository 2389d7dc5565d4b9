use anyhow::{bail, Context, Result};
use clap::Args;
use playback_api_types::{session_page_path, ErrorResponse, UploadResponse};
use playback_core::Session;
use playback_parsers::ingest_file;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_SERVER: &str = "PLAYBACK_SERVER";
pub const DEFAULT_SERVER: &str = "http://localhost:3000";

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Args)]
pub struct UploadArgs {
    /// Rollout (`.jsonl`) or session document (`.json`) to upload.
    pub file: PathBuf,
    /// Playback server base URL.
    #[arg(long, env = ENV_SERVER, default_value = DEFAULT_SERVER)]
    pub server: String,
    /// Open the playback page in the default browser.
    #[arg(long)]
    pub open: bool,
    /// Ask the server to attach an LLM summary.
    #[arg(long)]
    pub summarize: bool,
}

pub async fn run(args: UploadArgs) -> Result<()> {
    let session = ingest_file(&args.file)?;
    // stdout carries only the playback URL
    eprintln!(
        "Parsed {} ({} steps, {} tool calls)",
        args.file.display(),
        session.steps.len(),
        session.tool_call_count()
    );

    let server = args.server.trim_end_matches('/');
    let uploaded = upload_session(server, &session, args.summarize).await?;
    let url = session_url(server, &uploaded.session_id);
    println!("{url}");

    if args.open {
        open_in_browser(&url);
    }
    Ok(())
}

fn upload_endpoint(server: &str, summarize: bool) -> String {
    if summarize {
        format!("{server}/api/sessions?summarize=1")
    } else {
        format!("{server}/api/sessions")
    }
}

fn session_url(server: &str, session_id: &str) -> String {
    format!("{server}{}", session_page_path(session_id))
}

async fn upload_session(server: &str, session: &Session, summarize: bool) -> Result<UploadResponse> {
    let client = reqwest::Client::builder()
        .timeout(UPLOAD_TIMEOUT)
        .build()
        .context("build HTTP client")?;

    let endpoint = upload_endpoint(server, summarize);
    tracing::debug!("POST {endpoint}");
    let resp = client
        .post(&endpoint)
        .json(session)
        .send()
        .await
        .with_context(|| format!("Failed to reach {server}"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        bail!("Upload failed (HTTP {}): {}", status.as_u16(), message);
    }

    resp.json::<UploadResponse>()
        .await
        .context("Invalid upload response")
}

/// Best effort; a missing opener is not an upload failure.
fn open_in_browser(url: &str) {
    let mut cmd = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = std::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        std::process::Command::new("xdg-open")
    };

    if let Err(e) = cmd.arg(url).spawn() {
        tracing::debug!("could not open browser: {e}");
    }
}
