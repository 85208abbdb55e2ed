//! Feed connection lifecycle.
//!
//! Handles the WebSocket connection to the tick feed: opening with
//! authentication, subscribing the configured symbols, automatic
//! reconnection after unintentional closure, and graceful unsubscribe
//! plus close on disconnect.

use crate::error::{WsError, WsResult};
use crate::message::{FeedDirective, FeedEnvelope};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use fxwatch_core::{ConnectionState, Tick};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async_tls_with_config, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL of the feed.
    pub url: String,
    /// API token, appended as a `token` query parameter. Empty disables auth.
    pub token: String,
    /// Symbols to subscribe after every (re)connect.
    pub symbols: Vec<String>,
    /// Fixed delay before a reconnect attempt.
    pub reconnect_delay_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            symbols: Vec::new(),
            reconnect_delay_ms: 5000,
        }
    }
}

/// WebSocket connection to the tick feed.
///
/// Cheap to clone; clones share the same connection. One connection
/// owns one message-loop task at a time. The loop is the only place a
/// reconnect delay can be pending, so disconnecting cancels any
/// scheduled reconnect along with the loop itself.
#[derive(Clone)]
pub struct FeedConnection {
    config: ConnectionConfig,
    state: Arc<RwLock<ConnectionState>>,
    batch_tx: mpsc::Sender<Vec<Tick>>,
    /// Replaced on every `connect` so the connection can be restarted
    /// after a cancel.
    shutdown_token: Arc<RwLock<CancellationToken>>,
    /// Handle to the running message loop. `connect` awaits it when the
    /// previous loop is still winding down after a cancel.
    loop_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl FeedConnection {
    /// Create a new feed connection. Trade batches are delivered on
    /// `batch_tx` once connected.
    pub fn new(config: ConnectionConfig, batch_tx: mpsc::Sender<Vec<Tick>>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            batch_tx,
            shutdown_token: Arc::new(RwLock::new(CancellationToken::new())),
            loop_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Check whether the feed is currently connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Open the connection, subscribe the configured symbols, and start
    /// the message loop.
    ///
    /// A no-op returning `Ok` when the connection is already active in
    /// any form. A connect issued while a disconnect is still tearing
    /// the previous loop down waits for that teardown, then opens a new
    /// channel. A failed open leaves the connection `Disconnected` and
    /// does not schedule a reconnect.
    pub async fn connect(&self) -> WsResult<()> {
        self.await_teardown().await;

        {
            let mut state = self.state.write();
            if *state != ConnectionState::Disconnected {
                debug!(state = %*state, "Connect ignored, connection already active");
                return Ok(());
            }
            *state = ConnectionState::Connecting;
        }

        let shutdown = CancellationToken::new();
        *self.shutdown_token.write() = shutdown.clone();

        let (write, read) = match self.open_and_subscribe().await {
            Ok(streams) => streams,
            Err(e) => {
                *self.state.write() = ConnectionState::Disconnected;
                return Err(e);
            }
        };

        *self.state.write() = ConnectionState::Connected;
        info!(url = %self.config.url, symbols = self.config.symbols.len(), "Feed connected");

        let task = tokio::spawn(self.clone().run_loop(write, read, shutdown));
        *self.loop_task.lock() = Some(task);
        Ok(())
    }

    /// Wait for a cancelled message loop to finish winding down. Without
    /// this, a connect issued right after a disconnect would observe the
    /// old state as still active and silently skip opening a channel.
    async fn await_teardown(&self) {
        if !self.shutdown_token.read().is_cancelled() {
            return;
        }
        let task = self.loop_task.lock().take();
        if let Some(task) = task {
            debug!("Waiting for previous message loop to wind down");
            if task.await.is_err() {
                warn!("Previous message loop task panicked");
            }
        }
    }

    /// Request an intentional disconnect.
    ///
    /// Cancels the message loop, which unsubscribes and sends a Close
    /// frame if the socket is still up, or aborts a pending reconnect
    /// delay if it is not.
    pub fn disconnect(&self) {
        info!("Feed disconnect requested");
        self.shutdown_token.read().cancel();
    }

    async fn open_and_subscribe(&self) -> WsResult<(WsSink, WsSource)> {
        let url = self.feed_url();
        debug!(url = %self.config.url, "Opening feed socket");

        let (ws_stream, _response) = connect_async_tls_with_config(&url, None, true, None)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;
        let (mut write, read) = ws_stream.split();

        for symbol in &self.config.symbols {
            let text = serde_json::to_string(&FeedDirective::subscribe(symbol.clone()))?;
            write.send(Message::Text(text)).await?;
        }
        debug!(count = self.config.symbols.len(), "Subscriptions sent");

        Ok((write, read))
    }

    fn feed_url(&self) -> String {
        if self.config.token.is_empty() {
            self.config.url.clone()
        } else {
            format!("{}?token={}", self.config.url, self.config.token)
        }
    }

    async fn run_loop(
        self,
        mut write: WsSink,
        mut read: WsSource,
        shutdown: CancellationToken,
    ) {
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    info!("Shutdown signal received in message loop");
                    self.graceful_close(&mut write).await;
                    *self.state.write() = ConnectionState::Disconnected;
                    return;
                }

                msg = read.next() => {
                    let closure = match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.forward_trades(&text).await;
                            None
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            write.send(Message::Pong(data)).await.err().map(WsError::from)
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            Some(WsError::ConnectionClosed { code, reason })
                        }
                        Some(Err(e)) => Some(e.into()),
                        None => Some(WsError::ConnectionClosed {
                            code: 1006,
                            reason: "Stream ended".to_string(),
                        }),
                        Some(Ok(_)) => None,
                    };

                    if let Some(cause) = closure {
                        warn!(%cause, "Feed connection lost");
                        match self.reconnect(&shutdown).await {
                            Some((w, r)) => {
                                write = w;
                                read = r;
                            }
                            None => return,
                        }
                    }
                }
            }
        }
    }

    /// Reconnect after the fixed delay, retrying until the socket opens
    /// or the shutdown token cancels the wait.
    async fn reconnect(&self, shutdown: &CancellationToken) -> Option<(WsSink, WsSource)> {
        let delay = Duration::from_millis(self.config.reconnect_delay_ms);

        loop {
            *self.state.write() = ConnectionState::Reconnecting;
            warn!(delay_ms = self.config.reconnect_delay_ms, "Reconnecting after delay");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = shutdown.cancelled() => {
                    info!("Shutdown requested during reconnect delay, not reconnecting");
                    *self.state.write() = ConnectionState::Disconnected;
                    return None;
                }
            }

            match self.open_and_subscribe().await {
                Ok(streams) => {
                    *self.state.write() = ConnectionState::Connected;
                    info!("Feed reconnected");
                    return Some(streams);
                }
                Err(e) => {
                    error!(%e, "Reconnect attempt failed");
                }
            }
        }
    }

    /// Parse a text frame and forward its trade batch downstream.
    /// Non-trade, empty, and unparseable frames are discarded.
    async fn forward_trades(&self, text: &str) {
        let envelope: FeedEnvelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(%e, "Discarding unparseable frame");
                return;
            }
        };

        let Some(batch) = envelope.trade_batch() else {
            return;
        };

        if self.batch_tx.send(batch).await.is_err() {
            warn!("Trade batch receiver dropped");
        }
    }

    /// Best-effort unsubscribe and Close before tearing the socket down.
    async fn graceful_close(&self, write: &mut WsSink) {
        for symbol in &self.config.symbols {
            let Ok(text) = serde_json::to_string(&FeedDirective::unsubscribe(symbol.clone()))
            else {
                continue;
            };
            if write.send(Message::Text(text)).await.is_err() {
                debug!("Socket gone before unsubscribe completed");
                return;
            }
        }

        if let Err(e) = write.send(Message::Close(None)).await {
            debug!(?e, "Failed to send Close frame during shutdown");
        }
    }
}
