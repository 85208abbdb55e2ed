//! Core domain types for the fxwatch forex tracker.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `Price`, `Volume`: precision-safe numeric types
//! - `Tick`, `PriceRecord`, `Direction`: market data
//! - `Holding`: a position held at a weighted-average purchase price
//! - `ConnectionState`: feed lifecycle states

pub mod decimal;
pub mod error;
pub mod holding;
pub mod symbol;
pub mod tick;

pub use decimal::{round_percent, Price, Volume};
pub use error::{CoreError, Result};
pub use holding::Holding;
pub use symbol::display_symbol;
pub use tick::{Direction, PriceRecord, Tick};

use serde::{Deserialize, Serialize};

/// Feed connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "DISCONNECTED"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::Connected => write!(f, "CONNECTED"),
            Self::Reconnecting => write!(f, "RECONNECTING"),
        }
    }
}
