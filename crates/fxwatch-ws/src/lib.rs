//! WebSocket feed client for forex trade data.
//!
//! Provides the live connection to the upstream tick feed:
//! - Automatic reconnection with a fixed, cancellable delay
//! - Subscription replay after every (re)connect
//! - Trade batch extraction and channel-based delivery

pub mod connection;
pub mod error;
pub mod message;

pub use connection::{ConnectionConfig, FeedConnection};
pub use error::{WsError, WsResult};
pub use message::{FeedDirective, FeedEnvelope};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
