//! Prey-Predator Client - terminal front end for the RL simulation service
//!
//! Drives a remote predator/prey episode: the human steers one agent with the
//! arrow keys or a mouse joystick, the service steps the simulation and the
//! terminal draws positions, trails and the episode timer.

mod app;
mod config;
mod game;
mod input;
mod remote;
mod render;
mod storage;
mod tui;
mod util;

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::{Config, LogFormat};
use crate::game::spawn_driver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // The terminal owns stdout, so logs go to a file
    init_tracing(&config)?;

    info!("Starting Prey-Predator Client");
    info!("Simulation service: {}", config.api_url);

    let render_output = config.render_output.clone();
    let state = AppState::new(config)?;

    let handle = spawn_driver(state.session(), state.client.clone(), render_output);
    tui::run(handle).await?;

    info!("Client shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;
    let writer = Arc::new(file);

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .init(),
    }

    Ok(())
}
