use anyhow::{Context, Result};
use clap::Args;
use playback_parsers::ingest_file;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct ParseArgs {
    /// Input file (`.jsonl` rollout or `.json` session document).
    pub file: PathBuf,
    /// Print single-line JSON instead of pretty output.
    #[arg(long)]
    pub compact: bool,
}

pub fn run(args: ParseArgs) -> Result<()> {
    let session = ingest_file(&args.file)?;
    tracing::info!(
        steps = session.steps.len(),
        tool_calls = session.tool_call_count(),
        "parsed {}",
        args.file.display()
    );

    let json = if args.compact {
        serde_json::to_string(&session)
    } else {
        serde_json::to_string_pretty(&session)
    }
    .context("serialize session")?;
    println!("{json}");
    Ok(())
}
