//! Subscriber Envelopes
//!
//! JSON messages exchanged with subscribers, discriminated by a `type` field.
//!
//! Server → client: `CONNECTED`, `SLOT_AVAILABLE`, `PONG`.
//! Client → server: `CONFIG`, `PING`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::connection::ConnectionId;
use super::notification::StructuredNotification;

/// Greeting text sent with `CONNECTED`.
pub const WELCOME_MESSAGE: &str = "Connected to slot notification stream";

/// Counters included in the `CONNECTED` greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedStats {
    /// Connections currently registered, this one included.
    pub active_clients: usize,
    /// Notifications broadcast since start.
    pub total_notifications: u64,
}

/// Messages sent to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerEnvelope {
    /// First envelope on every connection.
    Connected {
        /// Assigned connection id.
        client_id: ConnectionId,
        /// Human-readable greeting.
        message: String,
        /// Stats at accept time.
        stats: ConnectedStats,
    },
    /// A classified slot alert.
    SlotAvailable {
        /// The notification.
        data: StructuredNotification,
    },
    /// Reply to `PING`.
    Pong {
        /// Server time of the reply.
        timestamp: DateTime<Utc>,
    },
}

impl ServerEnvelope {
    /// Greeting for a freshly registered connection.
    #[must_use]
    pub fn connected(client_id: ConnectionId, stats: ConnectedStats) -> Self {
        Self::Connected {
            client_id,
            message: WELCOME_MESSAGE.to_string(),
            stats,
        }
    }

    /// Slot alert payload.
    #[must_use]
    pub const fn slot_available(data: StructuredNotification) -> Self {
        Self::SlotAvailable { data }
    }

    /// `PONG` stamped with the current time.
    #[must_use]
    pub fn pong() -> Self {
        Self::Pong {
            timestamp: Utc::now(),
        }
    }

    /// Serialize once; the result is shared by every recipient.
    pub fn encode(&self) -> Result<EncodedEnvelope, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(EncodedEnvelope(Arc::from(json)))
    }
}

/// A serialized server envelope. Cloning is a reference-count bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEnvelope(Arc<str>);

impl EncodedEnvelope {
    /// The JSON text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Messages received from subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientEnvelope {
    /// Declare subscription interest.
    Config {
        /// Country of interest.
        #[serde(default)]
        country: Option<String>,
        /// Center of interest.
        #[serde(default)]
        center: Option<String>,
    },
    /// Liveness probe.
    Ping,
}

impl ClientEnvelope {
    /// Parse an inbound text frame.
    ///
    /// Distinguishes unparseable payloads from well-formed JSON carrying an
    /// unknown `type`, so the two can be logged differently.
    pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| EnvelopeError::Malformed("missing string field 'type'".to_string()))?;

        if !matches!(kind, "CONFIG" | "PING") {
            return Err(EnvelopeError::UnknownType(kind.to_string()));
        }

        serde_json::from_value(value).map_err(|e| EnvelopeError::Malformed(e.to_string()))
    }
}

/// Inbound envelope errors. Logged and ignored by the connection loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// Not JSON, or JSON of the wrong shape.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// Well-formed envelope with an unrecognized `type`.
    #[error("unknown envelope type: {0}")]
    UnknownType(String),
}
