//! Fan-out Broadcaster
//!
//! Implements [`BroadcastPort`] over the connection hub. Each broadcast
//! serializes the payload once, takes a snapshot of the registered sinks,
//! and hands the shared payload to every open one. A failing connection is
//! logged and counted; it never stops delivery to the rest.

use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::BroadcastPort;
use crate::application::services::ConnectionHub;
use crate::domain::envelope::ServerEnvelope;
use crate::domain::notification::StructuredNotification;
use crate::infrastructure::metrics;

/// Hub-backed fan-out.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use slot_notifier::application::ports::BroadcastPort;
/// use slot_notifier::application::services::ConnectionHub;
/// use slot_notifier::domain::notification::Classifier;
/// use slot_notifier::infrastructure::broadcast::Broadcaster;
///
/// let hub = Arc::new(ConnectionHub::new());
/// let broadcaster = Broadcaster::new(Arc::clone(&hub));
///
/// let n = Classifier::default().classify("Sweden - Rabat");
/// assert_eq!(broadcaster.broadcast(&n), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Broadcaster {
    hub: Arc<ConnectionHub>,
}

impl Broadcaster {
    /// Create a broadcaster over the given hub.
    #[must_use]
    pub const fn new(hub: Arc<ConnectionHub>) -> Self {
        Self { hub }
    }
}

impl BroadcastPort for Broadcaster {
    fn broadcast(&self, notification: &StructuredNotification) -> usize {
        let started = Instant::now();

        let payload = match ServerEnvelope::slot_available(notification.clone()).encode() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode notification, nothing sent");
                return 0;
            }
        };

        let mut delivered = 0usize;
        for recipient in self.hub.recipients() {
            if !recipient.sink.is_open() {
                tracing::debug!(client_id = %recipient.id, "Skipping closed connection");
                metrics::record_delivery_failure("closed");
                continue;
            }

            match recipient.sink.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(client_id = %recipient.id, error = %e, "Delivery failed");
                    metrics::record_delivery_failure(e.reason());
                }
            }
        }

        metrics::record_deliveries(delivered as u64);
        metrics::record_broadcast_duration(started.elapsed());
        delivered
    }
}
