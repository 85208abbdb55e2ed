//! Feed wire protocol: outbound directives and inbound envelopes.

use fxwatch_core::Tick;
use serde::{Deserialize, Serialize};

/// Outbound control message to the feed.
///
/// Serializes as `{"type":"subscribe","symbol":"..."}` or the
/// unsubscribe equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedDirective {
    Subscribe { symbol: String },
    Unsubscribe { symbol: String },
}

impl FeedDirective {
    pub fn subscribe(symbol: impl Into<String>) -> Self {
        Self::Subscribe {
            symbol: symbol.into(),
        }
    }

    pub fn unsubscribe(symbol: impl Into<String>) -> Self {
        Self::Unsubscribe {
            symbol: symbol.into(),
        }
    }
}

/// Inbound message envelope from the feed.
///
/// The feed sends several message kinds over the same channel; only
/// `trade` envelopes carry tick data.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEnvelope {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub data: Option<Vec<Tick>>,
}

impl FeedEnvelope {
    /// Extract the trade batch, if this envelope carries one.
    ///
    /// Non-trade envelopes and trade envelopes with a missing or empty
    /// data array yield `None`.
    pub fn trade_batch(self) -> Option<Vec<Tick>> {
        if self.kind != "trade" {
            return None;
        }
        match self.data {
            Some(batch) if !batch.is_empty() => Some(batch),
            _ => None,
        }
    }
}
