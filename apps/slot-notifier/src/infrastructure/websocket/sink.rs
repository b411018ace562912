//! Channel-backed connection sink.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::application::ports::{ConnectionSink, SinkError};
use crate::domain::envelope::EncodedEnvelope;

/// [`ConnectionSink`] over the sending half of a connection's outbox.
///
/// The sink reads as closed once the writer task has dropped the receiver.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<EncodedEnvelope>,
}

impl ChannelSink {
    /// Wrap an outbox sender.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<EncodedEnvelope>) -> Self {
        Self { tx }
    }

    /// Create an outbox of the given depth and its sink.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EncodedEnvelope>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl ConnectionSink for ChannelSink {
    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn try_send(&self, envelope: EncodedEnvelope) -> Result<(), SinkError> {
        self.tx.try_send(envelope).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}
