//! Mock WebSocket feed server for integration tests.
//!
//! Provides a simple WebSocket server that can:
//! - Accept connections
//! - Record received messages
//! - Push frames to connected clients
//! - Close client connections on demand

use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Command broadcast to every connected client handler.
#[derive(Debug, Clone)]
enum ServerCommand {
    /// Send a text frame to the client.
    Frame(String),
    /// Send a Close frame and drop the connection.
    CloseClients,
}

/// A mock WebSocket feed server for testing.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    command_tx: broadcast::Sender<ServerCommand>,
    messages: Arc<Mutex<VecDeque<String>>>,
    connections: Arc<Mutex<u32>>,
}

impl MockWsServer {
    /// Start a new mock WebSocket server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let messages: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::new()));
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (command_tx, _) = broadcast::channel::<ServerCommand>(16);

        let messages_clone = messages.clone();
        let connections_clone = connections.clone();
        let command_tx_clone = command_tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let messages = messages_clone.clone();
                        let connections = connections_clone.clone();
                        let commands = command_tx_clone.subscribe();
                        tokio::spawn(handle_connection(stream, messages, connections, commands));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            command_tx,
            messages,
            connections,
        }
    }

    /// Get the server's WebSocket URL.
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Get the number of connections received.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Get all received messages.
    pub async fn received_messages(&self) -> Vec<String> {
        self.messages.lock().await.iter().cloned().collect()
    }

    /// Push a text frame to every connected client.
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.command_tx.send(ServerCommand::Frame(frame.into()));
    }

    /// Close every connected client with a normal Close frame.
    pub fn close_clients(&self) {
        let _ = self.command_tx.send(ServerCommand::CloseClients);
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    messages: Arc<Mutex<VecDeque<String>>>,
    connections: Arc<Mutex<u32>>,
    mut commands: broadcast::Receiver<ServerCommand>,
) {
    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let mut msgs = messages.lock().await;
                        msgs.push_back(text.clone());
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            cmd = commands.recv() => {
                match cmd {
                    Ok(ServerCommand::Frame(text)) => {
                        let _ = write.send(Message::Text(text)).await;
                    }
                    Ok(ServerCommand::CloseClients) => {
                        let _ = write.send(Message::Close(None)).await;
                        // Complete the close handshake: keep reading until the
                        // client's Close reply so text frames already in flight
                        // are still recorded instead of silently dropped.
                        while let Some(Ok(msg)) = read.next().await {
                            match msg {
                                Message::Text(text) => {
                                    let mut msgs = messages.lock().await;
                                    msgs.push_back(text.clone());
                                }
                                Message::Close(_) => break,
                                _ => {}
                            }
                        }
                        break;
                    }
                    Err(_) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockWsServer::start().await;
        assert!(server.url().starts_with("ws://127.0.0.1:"));
        server.shutdown().await;
    }
}
