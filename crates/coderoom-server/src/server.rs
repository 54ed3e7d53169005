//! Accept loop and background stats tick.

use std::time::Duration;

use coderoom_coordinator::Coordinator;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;

use crate::connection::handle_connection;

/// Accept connections forever, one task per client.
pub async fn serve(listener: TcpListener, coordinator: Coordinator, outbox_capacity: usize) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, addr, coordinator, outbox_capacity).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

/// Log session and connection counts every `interval`.
pub fn spawn_stats_tick(coordinator: Coordinator, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let stats = coordinator.stats().await;
            tracing::info!(
                sessions = stats.sessions,
                connections = stats.connections,
                joined = stats.joined,
                "Stats tick"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use coderoom_coordinator::Notification;
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn start() -> (String, Coordinator) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let coordinator = Coordinator::default();
        tokio::spawn(serve(listener, coordinator.clone(), 64));
        (url, coordinator)
    }

    async fn recv(client: &mut Client) -> Notification {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
                .await
                .expect("timed out waiting for a frame")
                .unwrap()
                .unwrap();
            if let Message::Text(text) = frame {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    async fn send(client: &mut Client, json: &str) {
        client.send(Message::Text(json.to_string().into())).await.unwrap();
    }

    async fn open(url: &str) -> Client {
        let (mut client, _) = connect_async(url).await.unwrap();
        let greeting = recv(&mut client).await;
        assert!(matches!(greeting, Notification::Connected { .. }));
        client
    }

    fn users(names: &[&str]) -> Notification {
        Notification::RosterChanged {
            users: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn room_round_trip_over_websocket() {
        let (url, coordinator) = start().await;
        let mut alice = open(&url).await;
        let mut bob = open(&url).await;

        send(&mut alice, r#"{"type":"join","roomId":"R1","userName":"alice"}"#).await;
        assert_eq!(recv(&mut alice).await, users(&["alice"]));

        send(&mut bob, r#"{"type":"join","roomId":"R1","userName":"bob"}"#).await;
        assert_eq!(recv(&mut alice).await, users(&["alice", "bob"]));
        assert_eq!(recv(&mut bob).await, users(&["alice", "bob"]));

        send(&mut alice, r#"{"type":"codeChange","roomId":"R1","code":"x=1"}"#).await;
        assert_eq!(
            recv(&mut bob).await,
            Notification::ContentUpdated { code: "x=1".into() }
        );

        bob.close(None).await.unwrap();
        assert_eq!(recv(&mut alice).await, users(&["alice"]));

        send(&mut alice, r#"{"type":"leaveRoom"}"#).await;
        // Ordering barrier: the error reply proves leaveRoom was processed.
        send(&mut alice, "not json").await;
        assert!(matches!(recv(&mut alice).await, Notification::Error { .. }));
        assert_eq!(coordinator.session_count().await, 0);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn stats_tick_is_visible_at_info() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        spawn_stats_tick(Coordinator::default(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Stats tick"), "log output: {output}");
        assert!(output.contains("sessions=0"));
    }

    #[tokio::test]
    async fn rejected_join_reports_error_and_allows_retry() {
        let (url, _coordinator) = start().await;
        let mut client = open(&url).await;

        send(&mut client, r#"{"type":"join","roomId":"R1","userName":""}"#).await;
        match recv(&mut client).await {
            Notification::Error { message } => assert!(message.contains("user name")),
            other => panic!("expected error, got {other:?}"),
        }

        send(&mut client, r#"{"type":"join","roomId":"R1","userName":"carol"}"#).await;
        assert_eq!(recv(&mut client).await, users(&["carol"]));
    }
}
