#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Slot Notifier - Appointment Slot Alert Fan-out
//!
//! Accepts free-text alerts about newly available appointment slots over
//! HTTP, classifies them into structured notifications, and pushes every
//! notification to all connected WebSocket subscribers.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure types and logic
//!   - `notification`: Structured notifications, keyword tables, classifier
//!   - `connection`: Connection identity, metadata and lifecycle
//!   - `stats`: Broadcast statistics
//!   - `envelope`: Subscriber wire messages
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: `ConnectionSink`, `BroadcastPort`
//!   - `services`: `ConnectionHub`, `IngestionGateway`
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `broadcast`: Hub-backed fan-out
//!   - `websocket`: `/ws` connection lifecycle
//!   - `http`: Routes and server runner
//!   - `config`, `telemetry`, `metrics`: Ambient stack
//!
//! # Data Flow
//!
//! ```text
//!                  ┌────────────┐   ┌────────────┐   ┌─────────────┐
//! POST /api/notify │ Ingestion  │──►│ Classifier │──►│ Broadcaster │──► outbox 1 ──► WS 1
//! ────────────────►│  Gateway   │   └────────────┘   │  (snapshot) │──► outbox 2 ──► WS 2
//!                  └────────────┘                    └─────────────┘──► outbox N ──► WS N
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Slot alert types and pure logic.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::connection::{ConnectionEntry, ConnectionId, Subscription};
pub use domain::envelope::{ClientEnvelope, ServerEnvelope};
pub use domain::notification::{Classifier, KeywordTables, StructuredNotification};
pub use domain::stats::BroadcastStatistics;

// Application services
pub use application::ports::{BroadcastPort, ConnectionSink, SinkError};
pub use application::services::{ConnectionHub, IngestError, IngestionGateway, SharedSecret};

// Infrastructure config
pub use infrastructure::config::{ConfigError, NotifierConfig, ServerSettings};

// HTTP server
pub use infrastructure::http::{AppState, HttpServer, ServerError, create_router};

// Broadcaster
pub use infrastructure::broadcast::Broadcaster;

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
