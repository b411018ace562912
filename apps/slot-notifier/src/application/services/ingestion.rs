//! Ingestion Gateway
//!
//! Authenticates inbound alerts, classifies them, hands them to the
//! broadcaster and records the outcome. Stats change only after a
//! successful broadcast; a rejected request leaves everything untouched.
//!
//! Broadcast and record run under one dispatch lock, so the notification
//! reported as last in the stats is always the one that went out last.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use subtle::ConstantTimeEq;

use super::hub::ConnectionHub;
use crate::application::ports::BroadcastPort;
use crate::domain::notification::{Classifier, StructuredNotification};

/// Pre-shared secret gating ingestion. Never printed.
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Constant-time comparison against a presented value.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Ingestion failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// Missing or wrong secret.
    #[error("unauthorized")]
    Unauthorized,

    /// Message missing or empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl IngestError {
    /// Metric label for this rejection.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// The classified notification.
    pub notification: StructuredNotification,
    /// Connections the payload was handed to.
    pub delivered: usize,
}

/// Authenticate, classify and fan out alerts.
#[derive(Debug)]
pub struct IngestionGateway<B> {
    secret: SharedSecret,
    classifier: Classifier,
    broadcaster: B,
    hub: Arc<ConnectionHub>,
    dispatch: Mutex<()>,
}

impl<B: BroadcastPort> IngestionGateway<B> {
    /// Create a gateway.
    #[must_use]
    pub const fn new(
        secret: SharedSecret,
        classifier: Classifier,
        broadcaster: B,
        hub: Arc<ConnectionHub>,
    ) -> Self {
        Self {
            secret,
            classifier,
            broadcaster,
            hub,
            dispatch: Mutex::new(()),
        }
    }

    /// Ingest one alert.
    ///
    /// The secret is checked before the message, so an unauthenticated
    /// caller learns nothing about input validation.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Unauthorized`] if `secret` is absent or wrong
    /// - [`IngestError::InvalidInput`] if `message` is absent or blank
    pub fn ingest(
        &self,
        secret: Option<&str>,
        message: Option<&str>,
    ) -> Result<IngestOutcome, IngestError> {
        if !secret.is_some_and(|s| self.secret.matches(s)) {
            return Err(IngestError::Unauthorized);
        }

        let raw = message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| IngestError::InvalidInput("message is required".to_string()))?;

        let notification = self.classifier.classify(raw);
        let delivered = {
            let _dispatch = self.dispatch.lock();
            let delivered = self.broadcaster.broadcast(&notification);
            self.hub.record_notification(&notification, delivered);
            delivered
        };

        tracing::info!(
            country = notification.country.as_deref().unwrap_or("-"),
            center = notification.center.as_deref().unwrap_or("-"),
            visa_type = notification.visa_type.as_deref().unwrap_or("-"),
            delivered,
            "Notification broadcast"
        );

        Ok(IngestOutcome {
            notification,
            delivered,
        })
    }
}
