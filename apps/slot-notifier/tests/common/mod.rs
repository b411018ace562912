//! Shared harness: a real server on an ephemeral port plus WebSocket and
//! in-process HTTP helpers.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use slot_notifier::{
    AppState, HttpServer, KeywordTables, NotifierConfig, ServerError, ServerSettings,
    SharedSecret, create_router,
};

pub const SECRET: &str = "integration-secret";

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: CancellationToken,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_outbox(ServerSettings::default().outbox_capacity).await
    }

    pub async fn start_with_outbox(outbox_capacity: usize) -> Self {
        let shutdown = CancellationToken::new();
        let state = AppState::new(
            NotifierConfig {
                secret: SharedSecret::new(SECRET),
                server: ServerSettings {
                    port: 0,
                    outbox_capacity,
                },
                keywords: KeywordTables::reference(),
            },
            shutdown.clone(),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(HttpServer::new(addr.port(), state.clone()).serve(listener));

        Self {
            addr,
            state,
            shutdown,
            handle,
        }
    }

    /// Connect a subscriber and consume its `CONNECTED` greeting.
    pub async fn subscribe(&self) -> (Client, serde_json::Value) {
        let (mut client, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .unwrap();
        let greeting = recv_json(&mut client).await;
        assert_eq!(greeting["type"], "CONNECTED");
        (client, greeting)
    }

    pub async fn notify(&self, message: &str, secret: &str) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({ "message": message, "secret": secret });
        let request = Request::builder()
            .method("POST")
            .uri("/api/notify")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.call(request).await
    }

    pub async fn stats(&self) -> serde_json::Value {
        let request = Request::builder()
            .uri("/api/stats")
            .body(Body::empty())
            .unwrap();
        let (status, json) = self.call(request).await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = create_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Poll until the registry holds `count` connections.
    pub async fn wait_for_clients(&self, count: usize) {
        timeout(RECV_TIMEOUT, async {
            while self.state.hub.len() != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "expected {count} clients, registry holds {}",
                self.state.hub.len()
            )
        });
    }
}

/// Next text frame as JSON, skipping control frames.
pub async fn recv_json(client: &mut Client) -> serde_json::Value {
    timeout(RECV_TIMEOUT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).unwrap();
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a text frame")
}

/// Assert nothing but control frames arrives within `wait`.
pub async fn assert_silent(client: &mut Client, wait: Duration) {
    let result = timeout(wait, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                other => return other,
            }
        }
    })
    .await;
    assert!(result.is_err(), "expected silence, got {result:?}");
}

pub async fn send_json(client: &mut Client, value: &serde_json::Value) {
    send_text(client, &value.to_string()).await;
}

pub async fn send_text(client: &mut Client, text: &str) {
    client.send(Message::text(text.to_string())).await.unwrap();
}
