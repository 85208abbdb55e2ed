//! Connection supervision.
//!
//! Bridges the feed connection to the latest-price table: owns the
//! start/stop lifecycle and a liveness flag that fences off trade
//! batches delivered after a stop.

use crate::error::{AppError, AppResult};
use fxwatch_core::Tick;
use fxwatch_feed::PriceTable;
use fxwatch_ws::{ConnectionConfig, FeedConnection};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const BATCH_CHANNEL_CAPACITY: usize = 256;

/// Supervises the feed connection and forwards trade batches into the
/// price table while the supervisor is live.
pub struct ConnectionSupervisor {
    feed: FeedConnection,
    table: Arc<PriceTable>,
    /// When false, delivered batches are dropped instead of applied.
    live: Arc<AtomicBool>,
    connecting: AtomicBool,
    connected: AtomicBool,
    last_error: Mutex<Option<String>>,
    /// Taken by the first `start`, which spawns the forwarding task.
    batch_rx: Mutex<Option<mpsc::Receiver<Vec<Tick>>>>,
}

impl ConnectionSupervisor {
    pub fn new(config: ConnectionConfig, table: Arc<PriceTable>) -> Self {
        let (batch_tx, batch_rx) = mpsc::channel(BATCH_CHANNEL_CAPACITY);
        Self {
            feed: FeedConnection::new(config, batch_tx),
            table,
            live: Arc::new(AtomicBool::new(false)),
            connecting: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            last_error: Mutex::new(None),
            batch_rx: Mutex::new(Some(batch_rx)),
        }
    }

    /// Start feed supervision: mark live, connect, and begin applying
    /// delivered batches to the table.
    ///
    /// A no-op returning `Ok` while a start is in flight or the feed is
    /// connected, so repeated calls produce a single connection attempt.
    /// A failed connect records the error and leaves the feed down.
    pub async fn start(&self) -> AppResult<()> {
        if self.connecting.swap(true, Ordering::SeqCst) {
            debug!("Start ignored, connection attempt in flight");
            return Ok(());
        }
        if self.connected.load(Ordering::SeqCst) {
            self.connecting.store(false, Ordering::SeqCst);
            debug!("Start ignored, feed already connected");
            return Ok(());
        }

        *self.last_error.lock() = None;
        self.live.store(true, Ordering::SeqCst);
        self.spawn_forwarder();

        let result = self.feed.connect().await;
        match &result {
            Ok(()) => {
                self.connected.store(true, Ordering::SeqCst);
                info!("Feed supervision started");
            }
            Err(e) => {
                error!(%e, "Feed start failed");
                *self.last_error.lock() = Some(e.to_string());
            }
        }
        self.connecting.store(false, Ordering::SeqCst);

        result.map_err(|e| AppError::WebSocket(Box::new(e)))
    }

    /// Stop feed supervision: fence off late batches, then disconnect.
    ///
    /// The liveness flag drops first so a batch already in the channel
    /// cannot reach the table after this returns.
    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
        self.feed.disconnect();
        self.connected.store(false, Ordering::SeqCst);
        info!("Feed supervision stopped");
    }

    /// Reconcile the connected flag with the actual feed state.
    pub fn check_connection(&self) -> bool {
        let connected = self.feed.is_connected();
        self.connected.store(connected, Ordering::SeqCst);
        connected
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::SeqCst)
    }

    /// Error message from the most recent failed start, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn price_table(&self) -> &Arc<PriceTable> {
        &self.table
    }

    pub fn feed(&self) -> &FeedConnection {
        &self.feed
    }

    /// Spawn the long-lived forwarding task on the first start.
    /// Later starts reuse it; the channel outlives stop/start cycles.
    fn spawn_forwarder(&self) {
        let Some(rx) = self.batch_rx.lock().take() else {
            return;
        };
        tokio::spawn(forward_batches(rx, self.table.clone(), self.live.clone()));
    }
}

/// Apply delivered batches while live; drop and count them otherwise.
async fn forward_batches(
    mut rx: mpsc::Receiver<Vec<Tick>>,
    table: Arc<PriceTable>,
    live: Arc<AtomicBool>,
) {
    while let Some(batch) = rx.recv().await {
        if live.load(Ordering::SeqCst) {
            table.apply_batch(batch);
        } else {
            table.stats().record_dropped();
            debug!(ticks = batch.len(), "Dropping trade batch delivered after stop");
        }
    }
    debug!("Trade forwarder exiting, channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxwatch_core::{Price, Volume};
    use rust_decimal_macros::dec;

    fn batch(symbol: &str) -> Vec<Tick> {
        vec![Tick {
            symbol: symbol.to_string(),
            price: Price::new(dec!(1.1000)),
            timestamp_ms: 1,
            volume: Volume::new(dec!(1)),
            conditions: None,
        }]
    }

    #[tokio::test]
    async fn test_forwarder_applies_while_live() {
        let (tx, rx) = mpsc::channel(8);
        let table = Arc::new(PriceTable::new());
        let live = Arc::new(AtomicBool::new(true));
        tokio::spawn(forward_batches(rx, table.clone(), live.clone()));

        tx.send(batch("OANDA:EUR_USD")).await.unwrap();
        drop(tx);

        // Channel closure flushes the pending batch before the task exits.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(table.get("OANDA:EUR_USD").is_some());
        assert_eq!(table.stats().dropped(), 0);
    }

    #[tokio::test]
    async fn test_forwarder_drops_after_stop() {
        let (tx, rx) = mpsc::channel(8);
        let table = Arc::new(PriceTable::new());
        let live = Arc::new(AtomicBool::new(false));
        tokio::spawn(forward_batches(rx, table.clone(), live.clone()));

        tx.send(batch("OANDA:EUR_USD")).await.unwrap();
        drop(tx);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(table.get("OANDA:EUR_USD").is_none());
        assert_eq!(table.stats().dropped(), 1);
    }

    #[tokio::test]
    async fn test_start_failure_records_error() {
        let config = ConnectionConfig {
            url: "ws://127.0.0.1:59999".to_string(),
            ..Default::default()
        };
        let supervisor = ConnectionSupervisor::new(config, Arc::new(PriceTable::new()));

        assert!(supervisor.start().await.is_err());
        assert!(supervisor.last_error().is_some());
        assert!(!supervisor.is_connected());
        assert!(!supervisor.is_connecting());
    }
}
