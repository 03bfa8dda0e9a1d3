//! coachd: runs the coaching pipeline and serves the UI Transport
//! websocket and Advice Query Interface HTTP routes (spec §5, §6.3, §6.4).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use racing_coach_adapter::{MockReplayAdapter, RawSample, SimulatorAdapter};
use racing_coach_config::CoachConfig;
use racing_coach_contracts::SessionDescriptor;
use racing_coach_supervisor::Supervisor;
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "coachd")]
#[command(about = "Coaching pipeline daemon")]
#[command(version)]
struct Args {
    /// Path to the JSON config file. Defaults to the per-platform config
    /// path, writing a fresh default file if none exists.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the HTTP/websocket server to.
    #[arg(long, default_value = "127.0.0.1:7878")]
    bind: String,

    /// Replay a recorded session instead of connecting to a live
    /// simulator. See `ReplayFile` for the expected JSON shape.
    #[arg(long)]
    replay: Option<PathBuf>,
}

/// On-disk shape for `--replay`: a session descriptor plus the raw
/// sample sequence `MockReplayAdapter` plays back in order.
#[derive(Debug, Deserialize)]
struct ReplayFile {
    session: SessionDescriptor,
    samples: Vec<RawSample>,
}

#[tokio::main]
async fn main() -> Result<()> {
    racing_coach_tracing::init_logging("coachd");
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CoachConfig::load_from_path(path).await?,
        None => CoachConfig::load().await?,
    };

    let adapter: Box<dyn SimulatorAdapter> = match &args.replay {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read replay file: {path:?}"))?;
            let replay: ReplayFile = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse replay file: {path:?}"))?;
            Box::new(MockReplayAdapter::new("replay", replay.session, replay.samples))
        }
        None => {
            anyhow::bail!(
                "no live simulator adapter is wired into this build; pass --replay to run against a recorded session"
            );
        }
    };

    let supervisor = Supervisor::new(config, None).await?;

    let router = supervisor.ui_router().merge(supervisor.advice_router());
    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(bind = %args.bind, "serving UI Transport and Advice Query Interface");

    tokio::select! {
        result = axum::serve(listener, router) => {
            result.context("HTTP server exited")?;
        }
        result = supervisor.run(adapter, None) => {
            result.context("pipeline exited")?;
        }
    }

    Ok(())
}
