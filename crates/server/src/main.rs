//! file-browser
//!
//! Serves a directory tree read-only over HTTP.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use file_browser::config::{default_config_path, Config, ConfigOverrides};
use file_browser::{router, AppState};
use tracing_subscriber::EnvFilter;

/// file-browser - browse, preview and download files from one directory.
#[derive(Parser, Debug)]
#[command(name = "file-browser")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load(&config_path)?;
    config.apply_overrides(cli.overrides);

    let settings = config.validate().context("Invalid configuration")?;

    init_tracing(&settings.log_level, cli.verbose);
    tracing::info!("Starting file-browser: {}", settings);

    let app = router(AppState::new(&settings));

    let addr = settings.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize tracing. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str, verbose: bool) {
    let default_level = if verbose { "debug" } else { log_level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("Failed to register signal handlers: {}", e);
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT");
        }
    }
}

/// Wait for a shutdown signal (Ctrl+C).
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C"),
        Err(e) => {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
