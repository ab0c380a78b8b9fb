//! Kiosk Rotator (kiosk-rotator) - Main entry point
//!
//! Runs the media rotation engine against the configured catalog and serves
//! the read-only status API alongside it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use kiosk_common::config::ConfigResolver;
use kiosk_common::events::EventBus;
use kiosk_rotator::api::{self, AppContext};
use kiosk_rotator::catalog;
use kiosk_rotator::config::{CliOverrides, Config};
use kiosk_rotator::rotation::RotationManager;
use kiosk_rotator::runtime::RotationRuntime;
use kiosk_rotator::surface::SimulatedSurface;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Capacity of the event broadcast channel
const EVENT_BUS_CAPACITY: usize = 256;

/// Command-line arguments for kiosk-rotator
#[derive(Parser, Debug)]
#[command(name = "kiosk-rotator")]
#[command(about = "Media rotation engine for kiosk displays")]
#[command(version)]
struct Args {
    /// Bootstrap config file (overrides KIOSK_CONFIG and platform paths)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Status API port
    #[arg(short, long, env = "KIOSK_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "KIOSK_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is loaded first because it supplies the default log level
    let config_path = ConfigResolver::new(args.config.clone()).resolve();
    let config = Config::load(
        config_path.as_deref(),
        CliOverrides {
            port: args.port,
            log_level: args.log_level.clone(),
        },
    )
    .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Kiosk Rotator v{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none, using compiled defaults"),
    }
    info!(
        "Groups: {}",
        config
            .groups
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let events = EventBus::new(EVENT_BUS_CAPACITY);
    let provider = catalog::from_config(&config.catalog).context("Failed to initialize catalog")?;
    let manager = RotationManager::new(config.groups.clone(), config.rotation, events.clone())
        .context("Failed to initialize rotation")?;
    let runtime = RotationRuntime::new(
        manager,
        provider,
        Box::new(SimulatedSurface::new()),
        config.refresh_interval,
    );

    let ctx = AppContext {
        snapshots: runtime.snapshots(),
        events,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runtime_task = tokio::spawn(runtime.run(wait_for_shutdown(shutdown_rx.clone())));
    let mut server = tokio::spawn(api::run(config.port, ctx, wait_for_shutdown(shutdown_rx)));

    // A server that exits early (e.g. port in use) also stops the engine
    let early_exit = tokio::select! {
        _ = shutdown_signal() => None,
        result = &mut server => Some(result),
    };
    let _ = shutdown_tx.send(true);

    let server_result = match early_exit {
        Some(result) => result,
        None => server.await,
    };
    runtime_task.await.context("Rotation runtime panicked")?;
    server_result
        .context("HTTP server task panicked")?
        .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
