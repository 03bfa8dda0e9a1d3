//! coachctl: reads the Advice Query Interface's read-only endpoints
//! (spec §6.4) against a running `coachd`.
//!
//! Mode switching and live history replay go over the UI Transport's
//! websocket (spec §6.3), which is the in-car UI client's channel, not
//! this tool's, coachctl is scoped to the REST advice surface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coachctl")]
#[command(about = "Query a running coachd's Advice Query Interface")]
#[command(version)]
struct Args {
    /// Base URL of the running coachd instance.
    #[arg(long, default_value = "http://127.0.0.1:7878")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// GET /advice/session_summary
    SessionSummary,
    /// GET /advice/persistent_mistakes
    PersistentMistakes,
    /// GET /advice/focus_areas
    FocusAreas,
    /// GET /advice/corner/{id}
    Corner {
        /// Corner/segment name.
        id: String,
    },
    /// GET /advice/recent_mistakes?window_s=...
    RecentMistakes {
        /// Lookback window in seconds.
        #[arg(long, default_value_t = 60.0)]
        window_s: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();

    let path = match &args.command {
        Command::SessionSummary => "/advice/session_summary".to_string(),
        Command::PersistentMistakes => "/advice/persistent_mistakes".to_string(),
        Command::FocusAreas => "/advice/focus_areas".to_string(),
        Command::Corner { id } => format!("/advice/corner/{id}"),
        Command::RecentMistakes { window_s } => format!("/advice/recent_mistakes?window_s={window_s}"),
    };

    let url = format!("{}{path}", args.url);
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error status"))?;

    let body: serde_json::Value = response.json().await.context("response was not valid JSON")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
