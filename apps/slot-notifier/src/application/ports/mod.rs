//! Port Interfaces
//!
//! Contracts between the application layer and infrastructure adapters,
//! following the Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - `ConnectionSink`: Non-blocking handoff of envelopes to one subscriber
//! - `BroadcastPort`: Distribution of a notification to every subscriber

use crate::domain::envelope::EncodedEnvelope;
use crate::domain::notification::StructuredNotification;

/// Why a sink refused an envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The transport has gone away.
    #[error("connection closed")]
    Closed,

    /// The connection's outbound queue is full.
    #[error("outbound queue full")]
    Full,

    /// The envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(String),
}

impl SinkError {
    /// Metric label for this failure.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Full => "full",
            Self::Encode(_) => "encode",
        }
    }
}

/// Outbound side of one subscriber connection.
///
/// Implementations must never block: `try_send` either queues the envelope
/// for a writer task or fails immediately.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionSink: Send + Sync {
    /// Whether the transport is still accepting envelopes.
    fn is_open(&self) -> bool;

    /// Queue an envelope for delivery.
    fn try_send(&self, envelope: EncodedEnvelope) -> Result<(), SinkError>;
}

/// Fan-out of a notification to the current subscriber set.
#[cfg_attr(test, mockall::automock)]
pub trait BroadcastPort: Send + Sync {
    /// Deliver to every open subscriber. Returns how many accepted it.
    fn broadcast(&self, notification: &StructuredNotification) -> usize;
}
