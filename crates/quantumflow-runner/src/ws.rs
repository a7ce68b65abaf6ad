//! WebSocket telemetry server.
//!
//! The matching thread enqueues frames onto a tokio broadcast channel (a
//! non-blocking send); an axum server fans them out to every connected
//! client on the runtime's threads. Slow or disconnected clients are
//! dropped silently; delivery is at-most-once.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::telemetry::TelemetrySink;

/// Frames buffered per client before a laggard starts losing messages.
const BROADCAST_CAPACITY: usize = 1024;

/// Telemetry sink backed by the broadcast channel.
pub struct WsSink {
    tx: broadcast::Sender<String>,
}

impl WsSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Sender half for the server task.
    pub fn sender(&self) -> broadcast::Sender<String> {
        self.tx.clone()
    }

    /// Currently connected clients.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for WsSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for WsSink {
    fn publish(&self, frame: String) {
        // Errors only mean "no receivers right now"; frames are best-effort.
        let _ = self.tx.send(frame);
    }
}

/// Serve `/ws` (telemetry stream) and `/health` until the runtime stops.
pub async fn start_server(tx: broadcast::Sender<String>, port: u16) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(tx);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("[WS] telemetry server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "quantumflow",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<broadcast::Sender<String>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, tx))
}

async fn handle_socket(socket: WebSocket, tx: broadcast::Sender<String>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = tx.subscribe();

    info!("[WS] client connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(frame) => {
                    if sender.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                // A lagging client skips the overwritten frames and
                // continues from the oldest retained one.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("[WS] client lagged, skipped {} frames", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Inbound traffic is drained and ignored; the stream is one-way.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }
    info!("[WS] client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_clients_is_dropped() {
        let sink = WsSink::new();
        assert_eq!(sink.client_count(), 0);
        // No receivers: the frame is discarded, not an error.
        sink.publish("{\"type\":\"latency\"}".to_string());
    }

    #[test]
    fn test_client_count_tracks_subscribers() {
        let sink = WsSink::new();
        let rx1 = sink.sender().subscribe();
        let rx2 = sink.sender().subscribe();
        assert_eq!(sink.client_count(), 2);
        drop(rx1);
        drop(rx2);
        assert_eq!(sink.client_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribed_client_receives_frames() {
        let sink = WsSink::new();
        let mut rx = sink.sender().subscribe();
        sink.publish("frame-1".to_string());
        sink.publish("frame-2".to_string());

        assert_eq!(rx.recv().await.unwrap(), "frame-1");
        assert_eq!(rx.recv().await.unwrap(), "frame-2");
    }
}
