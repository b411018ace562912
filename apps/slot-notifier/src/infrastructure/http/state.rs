//! Shared handler state.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::services::{ConnectionHub, IngestionGateway};
use crate::domain::notification::Classifier;
use crate::infrastructure::broadcast::Broadcaster;
use crate::infrastructure::config::NotifierConfig;

/// State shared by every route.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection registry and statistics.
    pub hub: Arc<ConnectionHub>,
    /// Ingestion use case.
    pub gateway: Arc<IngestionGateway<Broadcaster>>,
    /// Outbound queue depth per subscriber.
    pub outbox_capacity: usize,
    /// Cancelled on shutdown; ends every WebSocket loop.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire hub, broadcaster and gateway from configuration.
    #[must_use]
    pub fn new(config: NotifierConfig, shutdown: CancellationToken) -> Self {
        let hub = Arc::new(ConnectionHub::new());
        let gateway = IngestionGateway::new(
            config.secret,
            Classifier::new(config.keywords),
            Broadcaster::new(Arc::clone(&hub)),
            Arc::clone(&hub),
        );

        Self {
            hub,
            gateway: Arc::new(gateway),
            outbox_capacity: config.server.outbox_capacity,
            shutdown,
        }
    }
}
