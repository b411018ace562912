//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the application ports, plus the HTTP surface
//! and the ambient stack.

/// Hub-backed fan-out implementing `BroadcastPort`.
pub mod broadcast;

/// Configuration loading.
pub mod config;

/// HTTP routes, API errors and the server runner.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Logging and OpenTelemetry tracing.
pub mod telemetry;

/// Subscriber WebSocket endpoint.
pub mod websocket;
