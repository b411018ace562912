//! Connection Hub
//!
//! Registry of live subscriber connections, with the broadcast statistics
//! kept under the same lock. Every mutation of the registry and of the
//! connection counters happens in one critical section, so a stats snapshot
//! always reports `active_clients == registry size`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::application::ports::{ConnectionSink, SinkError};
use crate::domain::connection::{ConnectionEntry, ConnectionId, Subscription};
use crate::domain::envelope::{ConnectedStats, ServerEnvelope};
use crate::domain::notification::StructuredNotification;
use crate::domain::stats::{BroadcastStatistics, StatsAggregator};

/// A registered connection's sink, as handed to the broadcaster.
#[derive(Clone)]
pub struct Recipient {
    /// Connection id, for logging.
    pub id: ConnectionId,
    /// Outbound side of the connection.
    pub sink: Arc<dyn ConnectionSink>,
}

impl std::fmt::Debug for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipient").field("id", &self.id).finish_non_exhaustive()
    }
}

struct Registered {
    entry: ConnectionEntry,
    sink: Arc<dyn ConnectionSink>,
}

struct HubState {
    connections: Vec<Registered>,
    stats: StatsAggregator,
}

impl HubState {
    fn find_sink(&self, sink: &Arc<dyn ConnectionSink>) -> Option<ConnectionId> {
        self.connections
            .iter()
            .find(|r| std::ptr::addr_eq(Arc::as_ptr(&r.sink), Arc::as_ptr(sink)))
            .map(|r| r.entry.id)
    }

    fn insert(
        &mut self,
        id: ConnectionId,
        sink: Arc<dyn ConnectionSink>,
        remote_address: String,
    ) {
        self.connections.push(Registered {
            entry: ConnectionEntry::new(id, remote_address),
            sink,
        });
        self.stats.record_connection_opened();
    }

    const fn greeting(&self) -> ConnectedStats {
        ConnectedStats {
            active_clients: self.stats.active_clients(),
            total_notifications: self.stats.total_notifications(),
        }
    }
}

/// Live subscriber registry and broadcast statistics.
pub struct ConnectionHub {
    state: Mutex<HubState>,
}

impl std::fmt::Debug for ConnectionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHub")
            .field("connections", &self.len())
            .finish()
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionHub {
    /// Empty registry, statistics starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState {
                connections: Vec::new(),
                stats: StatsAggregator::new(),
            }),
        }
    }

    /// Register a connection.
    ///
    /// Re-adding a sink that is already registered is a no-op and returns
    /// the existing id. Returns the id together with the counters to put in
    /// the `CONNECTED` greeting, taken after registration.
    pub fn add(
        &self,
        sink: Arc<dyn ConnectionSink>,
        remote_address: impl Into<String>,
    ) -> (ConnectionId, ConnectedStats) {
        let mut state = self.state.lock();
        let id = match state.find_sink(&sink) {
            Some(id) => id,
            None => {
                let id = ConnectionId::generate();
                state.insert(id, sink, remote_address.into());
                id
            }
        };
        (id, state.greeting())
    }

    /// Queue the `CONNECTED` greeting on `sink` and register it, in one
    /// critical section. No broadcast can reach the connection before its
    /// greeting, and a sink that refuses the greeting is never registered.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the greeting could not be queued.
    pub fn admit(
        &self,
        sink: Arc<dyn ConnectionSink>,
        remote_address: impl Into<String>,
    ) -> Result<ConnectionId, SinkError> {
        let mut state = self.state.lock();
        if let Some(id) = state.find_sink(&sink) {
            return Ok(id);
        }

        let id = ConnectionId::generate();
        let mut greeting = state.greeting();
        greeting.active_clients += 1;

        let envelope = ServerEnvelope::connected(id, greeting)
            .encode()
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        sink.try_send(envelope)?;

        state.insert(id, sink, remote_address.into());
        Ok(id)
    }

    /// Replace a connection's subscription. Returns `false` for unknown ids.
    pub fn update_subscription(&self, id: ConnectionId, subscription: Subscription) -> bool {
        let mut state = self.state.lock();
        match state.connections.iter_mut().find(|r| r.entry.id == id) {
            Some(registered) => {
                registered.entry.subscription = subscription;
                true
            }
            None => false,
        }
    }

    /// Unregister a connection. Returns `false` if it was not registered,
    /// in which case the counters are left untouched.
    pub fn remove(&self, id: ConnectionId) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.connections.iter().position(|r| r.entry.id == id) else {
            return false;
        };
        state.connections.remove(index);
        state.stats.record_connection_closed();
        true
    }

    /// Metadata of every registered connection, in connect order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ConnectionEntry> {
        self.state
            .lock()
            .connections
            .iter()
            .map(|r| r.entry.clone())
            .collect()
    }

    /// Sinks of every registered connection. The lock is released before
    /// this returns, so later registrations do not see or affect the copy.
    #[must_use]
    pub fn recipients(&self) -> Vec<Recipient> {
        self.state
            .lock()
            .connections
            .iter()
            .map(|r| Recipient {
                id: r.entry.id,
                sink: Arc::clone(&r.sink),
            })
            .collect()
    }

    /// Registered connection count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().connections.len()
    }

    /// Whether no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a completed broadcast.
    pub fn record_notification(&self, notification: &StructuredNotification, delivered: usize) {
        self.state
            .lock()
            .stats
            .record_notification(notification, delivered);
    }

    /// Statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> BroadcastStatistics {
        self.state.lock().stats.snapshot()
    }
}
