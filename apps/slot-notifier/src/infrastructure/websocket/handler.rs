//! WebSocket connection lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::sink::ChannelSink;
use crate::application::ports::ConnectionSink;
use crate::application::services::ConnectionHub;
use crate::domain::connection::{ConnectionId, ConnectionState, Subscription};
use crate::domain::envelope::{ClientEnvelope, EncodedEnvelope, ServerEnvelope};
use crate::infrastructure::http::AppState;
use crate::infrastructure::metrics;

/// How long teardown waits for the writer to flush before aborting it.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, peer, state))
}

async fn handle_socket(socket: WebSocket, peer: SocketAddr, state: AppState) {
    let (sink, outbox) = ChannelSink::channel(state.outbox_capacity);
    let sink: Arc<dyn ConnectionSink> = Arc::new(sink);
    let (ws_sender, mut ws_receiver) = socket.split();
    let mut writer = tokio::spawn(write_outbox(ws_sender, outbox));

    let id = match state.hub.admit(Arc::clone(&sink), peer.ip().to_string()) {
        Ok(id) => id,
        Err(e) => {
            warn!(remote = %peer, error = %e, "Could not greet subscriber, dropping connection");
            writer.abort();
            return;
        }
    };

    let mut lifecycle = ConnectionState::default();
    lifecycle.open();
    metrics::record_connection_opened();
    metrics::set_active_clients(state.hub.len());
    info!(client_id = %id, remote = %peer, "Subscriber connected");

    loop {
        tokio::select! {
            () = state.shutdown.cancelled() => {
                debug!(client_id = %id, "Shutdown requested, closing connection");
                break;
            }
            frame = ws_receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_text(&state.hub, id, lifecycle, sink.as_ref(), text.as_str());
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Binary payloads are not part of the protocol; control
                // frames are answered by axum.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(client_id = %id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    }

    lifecycle.close();
    if state.hub.remove(id) {
        metrics::set_active_clients(state.hub.len());
        info!(client_id = %id, "Subscriber disconnected");
    }

    // Releasing the last sender ends the writer once the outbox is flushed.
    drop(sink);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
        .await
        .is_err()
    {
        writer.abort();
    }
}

fn handle_text(
    hub: &ConnectionHub,
    id: ConnectionId,
    lifecycle: ConnectionState,
    sink: &dyn ConnectionSink,
    text: &str,
) {
    if !lifecycle.is_open() {
        debug!(client_id = %id, state = lifecycle.as_str(), "Dropping inbound envelope");
        return;
    }

    match ClientEnvelope::parse(text) {
        Ok(ClientEnvelope::Config { country, center }) => {
            let subscription = Subscription::new(country, center);
            debug!(
                client_id = %id,
                country = subscription.country.as_deref().unwrap_or("-"),
                center = subscription.center.as_deref().unwrap_or("-"),
                "Subscription updated"
            );
            hub.update_subscription(id, subscription);
        }
        Ok(ClientEnvelope::Ping) => {
            let sent = ServerEnvelope::pong()
                .encode()
                .map_err(|e| e.to_string())
                .and_then(|pong| sink.try_send(pong).map_err(|e| e.to_string()));
            if let Err(e) = sent {
                debug!(client_id = %id, error = %e, "Could not queue PONG");
            }
        }
        Err(e) => {
            warn!(client_id = %id, error = %e, "Ignoring inbound envelope");
            metrics::record_malformed_envelope();
        }
    }
}

async fn write_outbox(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut outbox: mpsc::Receiver<EncodedEnvelope>,
) {
    while let Some(envelope) = outbox.recv().await {
        if ws_sender
            .send(Message::Text(envelope.as_str().to_owned().into()))
            .await
            .is_err()
        {
            return;
        }
    }
    let _ = ws_sender.close().await;
}
