//! Route handlers and response bodies.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::state::AppState;
use crate::domain::connection::normalize_address;
use crate::domain::notification::StructuredNotification;
use crate::domain::stats::{BroadcastStatistics, format_uptime};
use crate::infrastructure::metrics::{self, get_metrics_handle};

/// Service name reported by `/` and `/health`.
pub const SERVICE_NAME: &str = "slot-notifier";

// =============================================================================
// Ingestion
// =============================================================================

/// Ingestion request body. Both fields are optional at the wire level so
/// that missing values surface as 401/400 rather than a deserialization error.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotifyRequest {
    /// Raw alert text.
    #[serde(default)]
    pub message: Option<String>,
    /// Shared secret.
    #[serde(default)]
    pub secret: Option<String>,
}

/// Successful ingestion response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    /// Always `true`.
    pub success: bool,
    /// The classified notification.
    pub notification: StructuredNotification,
    /// Connections the payload was handed to.
    pub clients_notified: usize,
    /// Response time.
    pub timestamp: DateTime<Utc>,
}

pub(super) async fn notify(
    State(state): State<AppState>,
    body: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<Json<NotifyResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected malformed ingestion body");
        metrics::record_ingest_rejected("invalid_input");
        ApiError::bad_request(rejection.body_text())
    })?;

    let outcome = state
        .gateway
        .ingest(request.secret.as_deref(), request.message.as_deref())
        .map_err(|e| {
            tracing::warn!(reason = e.reason(), "Rejected ingestion");
            metrics::record_ingest_rejected(e.reason());
            ApiError::from(e)
        })?;

    metrics::record_notification();

    Ok(Json(NotifyResponse {
        success: true,
        notification: outcome.notification,
        clients_notified: outcome.delivered,
        timestamp: Utc::now(),
    }))
}

// =============================================================================
// Stats
// =============================================================================

/// Per-connection line in the stats response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    /// Connection id.
    pub id: String,
    /// Peer address, IPv4-mapped prefix stripped.
    pub address: String,
    /// Declared country interest.
    pub country: Option<String>,
    /// Declared center interest.
    pub center: Option<String>,
    /// Seconds since the connection was accepted.
    pub connected_seconds: i64,
}

/// Stats response: the statistics snapshot plus derived views.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Raw counters.
    #[serde(flatten)]
    pub stats: BroadcastStatistics,
    /// Uptime as `"{h}h {m}m {s}s"`.
    pub uptime: String,
    /// Uptime in whole seconds.
    pub uptime_seconds: u64,
    /// Registered connections.
    pub clients: Vec<ClientSummary>,
}

pub(super) async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let now = Utc::now();
    let stats = state.hub.stats();
    let uptime_seconds = uptime(stats.start_time, now).as_secs();

    let clients = state
        .hub
        .snapshot()
        .into_iter()
        .map(|entry| ClientSummary {
            id: entry.id.to_string(),
            address: normalize_address(&entry.remote_address).to_string(),
            connected_seconds: entry.connected_for(now).num_seconds(),
            country: entry.subscription.country,
            center: entry.subscription.center,
        })
        .collect();

    Json(StatsResponse {
        stats,
        uptime: format_uptime(uptime_seconds),
        uptime_seconds,
        clients,
    })
}

// =============================================================================
// Health and Service Info
// =============================================================================

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Registered connections.
    pub clients: usize,
    /// Seconds since start.
    pub uptime: f64,
}

pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.hub.stats();
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        clients: stats.active_clients,
        uptime: uptime(stats.start_time, Utc::now()).as_secs_f64(),
    })
}

pub(super) async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Service description returned by `/`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Route summary.
    pub endpoints: [&'static str; 6],
}

pub(super) async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        endpoints: [
            "GET /ws - Subscribe to slot notifications (WebSocket)",
            "POST /api/notify - Ingest a slot alert",
            "GET /api/stats - Broadcast statistics",
            "GET /health - Health check",
            "GET /healthz - Liveness probe",
            "GET /metrics - Prometheus metrics",
        ],
    })
}

pub(super) async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

fn uptime(start: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    now.signed_duration_since(start).to_std().unwrap_or_default()
}
