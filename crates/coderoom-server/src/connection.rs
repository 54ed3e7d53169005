//! Per-connection handler: register, then pump frames both ways until the
//! socket closes.

use std::net::SocketAddr;

use coderoom_common::ConnectionId;
use coderoom_coordinator::{ClientEvent, Coordinator, Notification};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

enum Flow {
    Continue,
    Close,
}

/// Handle a single WebSocket connection.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    coordinator: Coordinator,
    outbox_capacity: usize,
) {
    let (mut sink, mut stream) = ws.split();
    let connection_id = ConnectionId::new();

    // 1. Register with an outbox the coordinator fans notifications into.
    let (tx, mut rx) = mpsc::channel::<Notification>(outbox_capacity);
    if let Err(e) = coordinator.connect(connection_id.clone(), tx).await {
        tracing::warn!(peer = %addr, connection = %connection_id, error = %e, "Registration failed");
        let _ = send_notification(&mut sink, &Notification::error(e.to_string())).await;
        return;
    }

    tracing::info!(peer = %addr, connection = %connection_id, "Client connected");

    // 2. Forwarding loop.
    loop {
        tokio::select! {
            // Outbox -> this client's WebSocket
            Some(notification) = rx.recv() => {
                if send_notification(&mut sink, &notification).await.is_err() {
                    break;
                }
            }

            // This client's WebSocket -> coordinator
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match handle_text(&coordinator, &connection_id, &text, &mut sink).await {
                            Flow::Continue => {}
                            Flow::Close => break,
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // 3. Cleanup: same path as an explicit leave, then forget the connection.
    tracing::info!(peer = %addr, connection = %connection_id, "Client disconnected");
    if let Err(e) = coordinator.disconnect(&connection_id).await {
        tracing::warn!(connection = %connection_id, error = %e, "Disconnect cleanup failed");
        coordinator.drop_connection(&connection_id).await;
    }
}

/// Decode one text frame and apply it.
async fn handle_text(
    coordinator: &Coordinator,
    connection_id: &ConnectionId,
    text: &str,
    sink: &mut WsSink,
) -> Flow {
    let event = match ClientEvent::decode(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(connection = %connection_id, error = %e, "Malformed frame");
            let reply = Notification::error(format!("malformed event: {e}"));
            return match send_notification(sink, &reply).await {
                Ok(()) => Flow::Continue,
                Err(_) => Flow::Close,
            };
        }
    };

    let kind = event.kind();
    match coordinator.handle(connection_id, event).await {
        Ok(()) => Flow::Continue,
        Err(e) if e.is_registry_misuse() => {
            tracing::warn!(connection = %connection_id, event = kind, error = %e, "Registry misuse, dropping connection");
            coordinator.drop_connection(connection_id).await;
            Flow::Close
        }
        Err(e) => {
            tracing::debug!(connection = %connection_id, event = kind, error = %e, "Event rejected");
            match send_notification(sink, &Notification::error(e.to_string())).await {
                Ok(()) => Flow::Continue,
                Err(_) => Flow::Close,
            }
        }
    }
}

/// Send a notification as a JSON text frame.
async fn send_notification(
    sink: &mut WsSink,
    notification: &Notification,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let json = match notification.encode() {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode notification");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}
