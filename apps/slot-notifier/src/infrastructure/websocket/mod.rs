//! Subscriber WebSocket Endpoint
//!
//! `GET /ws` upgrades to a WebSocket. Each connection gets a bounded outbox
//! drained by its own writer task; everything else (greeting, broadcasts,
//! `PONG`) is queued through a [`ChannelSink`] and never blocks the caller.

mod handler;
mod sink;

pub use handler::ws_handler;
pub use sink::ChannelSink;
