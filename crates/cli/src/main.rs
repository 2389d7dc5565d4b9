mod parse_cmd;
mod upload;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "playback",
    about = "Turn codex rollouts into step-by-step session playbacks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a rollout (.jsonl) or session document (.json) to a playback server
    Upload(upload::UploadArgs),

    /// Transform a rollout and print the session JSON
    Parse(parse_cmd::ParseArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Upload(args) => upload::run(args).await,
        Commands::Parse(args) => parse_cmd::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
