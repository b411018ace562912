//! Domain Layer - Slot alert types and pure logic.
//!
//! Nothing here touches a socket or a lock: classification, connection
//! metadata and counters are plain values so they can be tested in
//! isolation and owned by whatever serializes access to them.

/// Structured notifications and the keyword-table classifier.
pub mod notification;

/// Subscriber connection identity, metadata and lifecycle.
pub mod connection;

/// Broadcast statistics aggregation.
pub mod stats;

/// JSON envelopes exchanged with subscribers.
pub mod envelope;
