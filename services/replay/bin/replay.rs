//! Main Entrypoint for the Avatar Replay CLI
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and command line.
//! 2. Initializing logging.
//! 3. Replaying the event script through a scripted avatar session.
//! 4. Printing the aggregated transcript.

use anyhow::Context;
use avatar_kit::AvatarConfig;
use avatar_kit_core::format_timestamp;
use avatar_replay::{format_transcript, load_script, run_replay};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use streaming_avatar::{AvatarQuality, StartAvatarRequest};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Replay a recorded streaming avatar session")]
struct Cli {
    /// JSON file containing the events to replay.
    #[arg(long)]
    script: PathBuf,
    /// Access token; overrides AVATAR_API_TOKEN.
    #[arg(long)]
    token: Option<String>,
    /// Service endpoint; overrides AVATAR_BASE_PATH.
    #[arg(long)]
    base_path: Option<String>,
    #[arg(long, default_value = "default")]
    avatar_name: String,
    #[arg(long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let mut config = AvatarConfig::from_env().context("Failed to load configuration")?;
    if cli.token.is_some() {
        config.api_token = cli.token;
    }
    if cli.base_path.is_some() {
        config.base_path = cli.base_path;
    }

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!(script = %cli.script.display(), "Configuration loaded. Loading script...");

    // --- 3. Replay ---
    let script = load_script(&cli.script)?;
    let request = StartAvatarRequest {
        quality: Some(AvatarQuality::Medium),
        language: cli.language,
        ..StartAvatarRequest::new(cli.avatar_name)
    };
    let events = script.len();
    let report = run_replay(&config, script, request).await?;
    info!(
        events,
        turns = report.transcript.len(),
        notifications = report.notifications,
        finished_at = %format_timestamp(Utc::now()),
        "Replay finished"
    );

    // --- 4. Output ---
    println!("{}", format_transcript(&report.transcript));
    Ok(())
}
