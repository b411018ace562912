//! Slot Notifier Binary
//!
//! Starts the alert ingestion and WebSocket fan-out server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin slot-notifier
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `NOTIFY_SECRET`: Shared secret for `POST /api/notify`
//!
//! ## Optional
//! - `PORT`: HTTP and WebSocket port (default: 3000)
//! - `NOTIFIER_OUTBOX_CAPACITY`: Outbound queue depth per subscriber (default: 64)
//! - `NOTIFIER_KEYWORDS_FILE`: YAML file replacing the built-in keyword tables
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: slot-notifier)
//! - `RUST_LOG`: Log level (default: info)

use std::time::Duration;

use anyhow::Context;
use slot_notifier::infrastructure::telemetry;
use slot_notifier::{AppState, HttpServer, NotifierConfig, init_metrics};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting slot notifier");

    let _metrics_handle = init_metrics();

    let config = NotifierConfig::from_env().context("failed to load configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();
    let port = config.server.port;
    let state = AppState::new(config, shutdown_token.clone());

    let mut server = tokio::spawn(HttpServer::new(port, state).run());

    tokio::select! {
        result = &mut server => {
            // The server only returns on its own if it failed to start.
            result.context("HTTP server task panicked")??;
            return Ok(());
        }
        () = await_shutdown_signal() => {}
    }

    shutdown_token.cancel();
    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server).await {
        Ok(result) => result.context("HTTP server task panicked")??,
        Err(_) => tracing::warn!("Graceful shutdown timed out"),
    }

    tracing::info!("Slot notifier stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &NotifierConfig) {
    tracing::info!(
        port = config.server.port,
        outbox_capacity = config.server.outbox_capacity,
        countries = config.keywords.countries.len(),
        centers = config.keywords.centers.len(),
        visa_types = config.keywords.visa_types.len(),
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for SIGTERM or SIGINT.
#[allow(clippy::expect_used)]
async fn await_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
