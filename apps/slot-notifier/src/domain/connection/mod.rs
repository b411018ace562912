//! Subscriber Connection Types
//!
//! Identity, metadata and lifecycle of a single subscriber connection.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──open()──► Open ──close()──► Closed
//!      └─────────────close()─────────────────┘
//! ```
//!
//! `Closed` is terminal. Reconnection is the subscriber's business; a new
//! transport gets a new [`ConnectionId`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Identity
// =============================================================================

/// Opaque identifier of a subscriber connection, unique for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Client-declared interest. Stored, reported in stats, never used to filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Country the client says it watches.
    pub country: Option<String>,
    /// Center the client says it watches.
    pub center: Option<String>,
}

impl Subscription {
    /// Build a subscription, treating blank strings as absent.
    #[must_use]
    pub fn new(country: Option<String>, center: Option<String>) -> Self {
        Self {
            country: country.filter(|c| !c.trim().is_empty()),
            center: center.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// One live subscriber connection as seen by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    /// Assigned at accept time.
    pub id: ConnectionId,
    /// Peer address, informational only.
    pub remote_address: String,
    /// When the connection was accepted.
    pub connected_at: DateTime<Utc>,
    /// Latest `CONFIG` values sent by the client.
    pub subscription: Subscription,
}

impl ConnectionEntry {
    /// Create an entry for a freshly accepted connection.
    #[must_use]
    pub fn new(id: ConnectionId, remote_address: impl Into<String>) -> Self {
        Self {
            id,
            remote_address: remote_address.into(),
            connected_at: Utc::now(),
            subscription: Subscription::default(),
        }
    }

    /// Time since the connection was accepted.
    #[must_use]
    pub fn connected_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.connected_at)
            .max(chrono::Duration::zero())
    }
}

/// Strip the IPv4-mapped IPv6 prefix so dual-stack peers read as plain IPv4.
#[must_use]
pub fn normalize_address(address: &str) -> &str {
    address.strip_prefix("::ffff:").unwrap_or(address)
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Protocol state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Transport accepted, not yet registered.
    #[default]
    Connecting,
    /// Registered and eligible for broadcasts.
    Open,
    /// Terminal. Nothing is sent after this.
    Closed,
}

impl ConnectionState {
    /// Move `Connecting` to `Open`. Returns whether the transition happened.
    pub fn open(&mut self) -> bool {
        if *self == Self::Connecting {
            *self = Self::Open;
            true
        } else {
            false
        }
    }

    /// Move to `Closed`. Returns `false` if already closed, so callers can
    /// run teardown exactly once even when close and error both fire.
    pub fn close(&mut self) -> bool {
        if *self == Self::Closed {
            false
        } else {
            *self = Self::Closed;
            true
        }
    }

    /// Whether the connection may receive envelopes.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Lowercase state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }

    #[test]
    fn id_serializes_as_string() {
        let id = ConnectionId::generate();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn blank_subscription_fields_are_absent() {
        let sub = Subscription::new(Some("  ".to_string()), Some("rabat".to_string()));
        assert_eq!(sub.country, None);
        assert_eq!(sub.center.as_deref(), Some("rabat"));
    }

    #[test]
    fn address_normalization() {
        assert_eq!(normalize_address("::ffff:10.0.0.7"), "10.0.0.7");
        assert_eq!(normalize_address("10.0.0.7"), "10.0.0.7");
        assert_eq!(normalize_address("::1"), "::1");
    }

    #[test]
    fn connected_for_never_negative() {
        let entry = ConnectionEntry::new(ConnectionId::generate(), "127.0.0.1");
        let earlier = entry.connected_at - chrono::Duration::seconds(5);
        assert_eq!(entry.connected_for(earlier), chrono::Duration::zero());
        let later = entry.connected_at + chrono::Duration::seconds(5);
        assert_eq!(entry.connected_for(later).num_seconds(), 5);
    }

    #[test]
    fn lifecycle_happy_path() {
        let mut state = ConnectionState::default();
        assert_eq!(state, ConnectionState::Connecting);
        assert!(!state.is_open());

        assert!(state.open());
        assert!(state.is_open());

        assert!(state.close());
        assert_eq!(state, ConnectionState::Closed);
    }

    #[test]
    fn close_is_reported_once() {
        let mut state = ConnectionState::Open;
        assert!(state.close());
        assert!(!state.close());
    }

    #[test]
    fn closed_cannot_reopen() {
        let mut state = ConnectionState::Closed;
        assert!(!state.open());
        assert_eq!(state.as_str(), "closed");
    }
}
