//! Portfolio holdings.

use crate::decimal::{Price, Volume};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A held position in one instrument.
///
/// Repeated acquisitions of the same instrument are merged into a single
/// holding at a volume-weighted average purchase price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Stable identifier, assigned at creation.
    pub id: String,
    /// Instrument symbol, e.g. `OANDA:EUR_USD`.
    pub symbol: String,
    /// Volume-weighted average price across all acquisitions.
    pub average_purchase_price: Price,
    /// Total held volume.
    pub volume: Volume,
    /// Timestamp of the first acquisition.
    pub purchase_date: DateTime<Utc>,
}

impl Holding {
    /// Create a new holding from an initial acquisition.
    pub fn new(symbol: impl Into<String>, price: Price, volume: Volume) -> Result<Self> {
        if !price.is_positive() {
            return Err(CoreError::InvalidPrice(price.to_string()));
        }
        if !volume.is_positive() {
            return Err(CoreError::InvalidVolume(volume.to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            average_purchase_price: price,
            volume,
            purchase_date: Utc::now(),
        })
    }

    /// Merge a further acquisition into this holding.
    ///
    /// The purchase price becomes the volume-weighted average of the
    /// existing position and the new acquisition. The id and original
    /// purchase date are kept.
    pub fn merge_acquisition(&mut self, price: Price, added: Volume) -> Result<()> {
        if !price.is_positive() {
            return Err(CoreError::InvalidPrice(price.to_string()));
        }
        if !added.is_positive() {
            return Err(CoreError::InvalidVolume(added.to_string()));
        }

        let combined = self.volume + added;
        let blended_cost = self.volume.notional(self.average_purchase_price) + added.notional(price);
        self.average_purchase_price = Price::new(blended_cost / combined.inner());
        self.volume = combined;
        Ok(())
    }

    /// Total cost basis of the position.
    pub fn cost_basis(&self) -> rust_decimal::Decimal {
        self.volume.notional(self.average_purchase_price)
    }
}
