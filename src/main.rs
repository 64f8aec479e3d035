use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prooflayer_ratelimit::config::ServiceConfig;
use prooflayer_ratelimit::http::{AppState, HttpServer};
use prooflayer_ratelimit::ratelimit::{RateLimiter, Sweeper};

#[derive(Parser, Debug)]
#[command(name = "prooflayer-ratelimit")]
#[command(about = "In-memory fixed-window rate limit service", version)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the HTTP listen address
    #[arg(long)]
    http_addr: Option<SocketAddr>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .init();
    }

    info!("Starting ProofLayer rate limit service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(addr) = args.http_addr {
        config.server.http_addr = addr;
    }
    info!(http_addr = %config.server.http_addr, "Configuration loaded");

    let policies = config.rate_limiting.load_policies()?;
    info!(policies = ?policies.names().collect::<Vec<_>>(), "Rate limit policies loaded");

    let rate_limiter = Arc::new(RateLimiter::new());
    let sweeper = Sweeper::spawn(Arc::clone(&rate_limiter), config.rate_limiting.sweep_interval());
    info!("Rate limiter initialized");

    let state = AppState::new(rate_limiter, policies);
    let server = HttpServer::new(config.server.http_addr, state);

    // Run the server with graceful shutdown on Ctrl+C
    let served = server.serve_with_shutdown(shutdown_signal()).await;

    sweeper.shutdown().await;
    served?;

    info!("ProofLayer rate limit service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
