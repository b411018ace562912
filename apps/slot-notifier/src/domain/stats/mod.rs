//! Broadcast Statistics
//!
//! Process-wide counters for connections and notifications. The aggregator
//! itself is a plain value; the connection hub owns it behind the same lock
//! as the registry so `active_clients` never drifts from the registry size.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::notification::StructuredNotification;

/// The most recent notification and how many connections it was handed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastNotification {
    /// The notification.
    #[serde(flatten)]
    pub notification: StructuredNotification,
    /// Connections the payload was handed to.
    pub clients_notified: usize,
}

/// Point-in-time view of the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastStatistics {
    /// Classified ingestions since start.
    pub total_notifications: u64,
    /// Connections opened since start.
    pub total_clients_ever_connected: u64,
    /// Connections currently registered.
    pub active_clients: usize,
    /// Most recent notification, if any.
    pub last_notification: Option<LastNotification>,
    /// Process start.
    pub start_time: DateTime<Utc>,
}

/// Cumulative counters for the fan-out subsystem.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    total_notifications: u64,
    total_clients_ever_connected: u64,
    active_clients: usize,
    last_notification: Option<LastNotification>,
    start_time: DateTime<Utc>,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregator {
    /// Start counting from now.
    #[must_use]
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    /// Start counting from a given instant.
    #[must_use]
    pub const fn started_at(start_time: DateTime<Utc>) -> Self {
        Self {
            total_notifications: 0,
            total_clients_ever_connected: 0,
            active_clients: 0,
            last_notification: None,
            start_time,
        }
    }

    /// A connection entered the registry.
    pub const fn record_connection_opened(&mut self) {
        self.total_clients_ever_connected += 1;
        self.active_clients += 1;
    }

    /// A connection left the registry.
    ///
    /// Callers pair every close with an earlier open.
    pub const fn record_connection_closed(&mut self) {
        debug_assert!(self.active_clients > 0, "connection closed without being opened");
        self.active_clients = self.active_clients.saturating_sub(1);
    }

    /// A notification was classified and broadcast.
    pub fn record_notification(&mut self, notification: &StructuredNotification, delivered: usize) {
        self.total_notifications += 1;
        self.last_notification = Some(LastNotification {
            notification: notification.clone(),
            clients_notified: delivered,
        });
    }

    /// Currently registered connections.
    #[must_use]
    pub const fn active_clients(&self) -> usize {
        self.active_clients
    }

    /// Classified ingestions since start.
    #[must_use]
    pub const fn total_notifications(&self) -> u64 {
        self.total_notifications
    }

    /// Copy every field at once.
    #[must_use]
    pub fn snapshot(&self) -> BroadcastStatistics {
        BroadcastStatistics {
            total_notifications: self.total_notifications,
            total_clients_ever_connected: self.total_clients_ever_connected,
            active_clients: self.active_clients,
            last_notification: self.last_notification.clone(),
            start_time: self.start_time,
        }
    }
}

/// Render an uptime as `"{h}h {m}m {s}s"`.
#[must_use]
pub fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}h {minutes}m {secs}s")
}
