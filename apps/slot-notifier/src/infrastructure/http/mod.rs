//! HTTP Server
//!
//! One axum listener serves ingestion, statistics, health, metrics and the
//! subscriber WebSocket endpoint.
//!
//! # Endpoints
//!
//! - `GET /` - Service description
//! - `GET /ws` - Subscriber WebSocket
//! - `POST /api/notify` - Ingest an alert (`{message, secret}`)
//! - `GET /api/stats` - Broadcast statistics and connection summary
//! - `GET /health` - JSON health status
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /metrics` - Prometheus metrics in text format

mod error;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

pub use error::{ApiError, ErrorBody};
pub use handlers::{
    ClientSummary, HealthResponse, NotifyRequest, NotifyResponse, SERVICE_NAME, ServiceInfo,
    StatsResponse,
};
pub use state::AppState;

use crate::infrastructure::websocket::ws_handler;

/// Create the router with every endpoint.
///
/// The WebSocket route needs peer addresses, so serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/ws", get(ws_handler))
        .route("/api/notify", post(handlers::notify))
        .route("/api/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        .route("/healthz", get(handlers::liveness))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}

/// HTTP and WebSocket server.
#[derive(Debug)]
pub struct HttpServer {
    port: u16,
    state: AppState,
}

impl HttpServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(port: u16, state: AppState) -> Self {
        Self { port, state }
    }

    /// Bind `0.0.0.0:port` and serve until the shutdown token is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the server encounters a
    /// fatal error while running.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(self.port, e.to_string()))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until the shutdown token is
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::ServerFailed` on a fatal server error.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(local) = listener.local_addr() {
            tracing::info!(addr = %local, "HTTP server listening");
        }

        let cancel = self.state.shutdown.clone();
        axum::serve(
            listener,
            create_router(self.state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// HTTP server error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),
    /// Server encountered a fatal error.
    #[error("HTTP server error: {0}")]
    ServerFailed(String),
}
