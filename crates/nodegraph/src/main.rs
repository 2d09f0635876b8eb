use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nodegraph_config::AppConfig;
use nodegraph_core::history::ManualClock;
use nodegraph_core::EditorSession;

mod script;

/// Replays node-graph editing scripts against the undo/redo history.
#[derive(Parser, Debug)]
#[command(name = "nodegraph", version, about)]
struct Cli {
    /// Script to replay. Reads stdin when omitted.
    script: Option<PathBuf>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_or_create(&config_path);
    tracing::info!("Using config {}", config_path.display());

    let text = match &cli.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read script from stdin")?;
            text
        }
    };
    let lines = script::parse_script(&text)?;

    let clock = ManualClock::new();
    let mut session = EditorSession::with_clock(&config, clock.clone());
    let mut out = std::io::stdout().lock();
    script::run_script(&mut session, &clock, &lines, &mut out)?;

    tracing::debug!(?session, "Script finished");
    Ok(())
}
