//! ZoneHub Server: zone board and waitlist rotation for a single chat
//!
//! Main entry point that wires the crates together and runs the console
//! transport.

mod console;

use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, fmt};

use zonehub_allocation::MemoryZoneAllocator;
use zonehub_core::config::AppConfig;
use zonehub_core::error::AppError;
use zonehub_core::traits::{Clock, SystemClock, ZoneAllocator};
use zonehub_service::{BoardFormatter, CommandDispatcher, SessionGate, StaticAdminDirectory};

/// Capacity of the domain event bus.
const EVENT_BUS_CAPACITY: usize = 64;

/// ZoneHub server
#[derive(Parser, Debug)]
#[command(name = "zonehub-server", version, about)]
struct Args {
    /// Base configuration file, without extension
    #[arg(long, default_value = "config/default")]
    config: String,

    /// Environment overlay loaded from config/<env>
    #[arg(long, env = "ZONEHUB_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppConfig::load(&args.config, &args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(config = %args.config, env = %args.env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // Logs go to stderr; stdout carries the chat transcript.
    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ZoneHub v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (events_tx, events_rx) = broadcast::channel(EVENT_BUS_CAPACITY);

    let allocator: Arc<dyn ZoneAllocator> =
        Arc::new(MemoryZoneAllocator::new(config.board.zone_count));

    let gate = Arc::new(SessionGate::new(
        allocator,
        &config.session,
        &config.rotation,
        Arc::clone(&clock),
        events_tx,
    ));
    tracing::info!(
        zones = config.board.zone_count,
        period_minutes = config.rotation.period_minutes,
        creator = %config.session.creator,
        "Session gate ready; waiting for authorization"
    );

    let admins = Arc::new(StaticAdminDirectory::from_config(&config.session));
    let formatter = BoardFormatter::new(&config.board, &config.rotation, &config.presentation);
    let dispatcher = CommandDispatcher::new(Arc::clone(&gate), admins, formatter, clock);

    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();
    let result = console::run(&dispatcher, events_rx, input, output, shutdown_signal()).await;

    gate.shutdown().await;
    tracing::info!("ZoneHub shut down");
    result
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
