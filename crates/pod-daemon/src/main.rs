//! # pod-daemon
//!
//! Proof of Day goal service.
//!
//! ## Usage
//!
//! ```text
//! pod-daemon --config pod.toml
//! pod-daemon --memory --bind 127.0.0.1:3001
//! ```
//!
//! With no config file the daemon runs fully offline: mock judge, mocked
//! attestations, goals stored under `.pod/`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pod_daemon::config::LogConfig;
use pod_daemon::{create_router, services, AppState, DaemonConfig};

/// Proof of Day goal service.
#[derive(Parser)]
#[command(name = "pod-daemon", about = "Proof of Day goal lifecycle service", version)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "pod.toml")]
    config: PathBuf,

    /// Listen address (overrides the config file).
    #[arg(long)]
    bind: Option<String>,

    /// Goal store directory (overrides the config file).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep goals in memory only.
    #[arg(long)]
    memory: bool,
}

fn init_tracing(log: &LogConfig) -> Result<()> {
    let default_directive = log.filter.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .context("invalid log filter")?;

    // Logs go to stderr so stdout stays free for piping.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DaemonConfig::load_or_default(&cli.config)?;
    config.apply_env();
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if cli.memory {
        config.memory = true;
    }

    init_tracing(&config.log)?;
    tracing::info!(version = pod_daemon::VERSION, config = %cli.config.display(), "starting Proof of Day daemon");

    let controller = services::build_controller(&config)?;
    let app = create_router(Arc::new(AppState::new(controller)));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(bind = %config.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("daemon shutting down");
    Ok(())
}
