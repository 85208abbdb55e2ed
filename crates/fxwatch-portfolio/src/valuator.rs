//! Holdings book and valuation.

use crate::error::{PortfolioError, PortfolioResult};
use fxwatch_core::{round_percent, Holding, Price, Volume};
use fxwatch_feed::PriceTable;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

/// A holding valued against the latest observed price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuedHolding {
    #[serde(flatten)]
    pub holding: Holding,
    /// Latest observed price; falls back to the purchase price when the
    /// symbol has no current observation.
    pub current_price: Price,
    pub total_value: Decimal,
    pub profit_loss: Decimal,
    /// Percentage, rounded to 3 digits.
    pub profit_loss_percent: Decimal,
}

/// A full portfolio valuation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValuation {
    pub positions: Vec<ValuedHolding>,
    pub total_value: Decimal,
    pub total_profit_loss: Decimal,
}

/// The book of held positions.
///
/// Acquisitions are priced at the latest observed feed price; repeated
/// acquisitions of a symbol merge into one holding at a volume-weighted
/// average price.
pub struct PortfolioBook {
    holdings: RwLock<Vec<Holding>>,
}

impl PortfolioBook {
    pub fn new() -> Self {
        Self {
            holdings: RwLock::new(Vec::new()),
        }
    }

    /// Restore a book from previously saved holdings.
    pub fn with_holdings(holdings: Vec<Holding>) -> Self {
        Self {
            holdings: RwLock::new(holdings),
        }
    }

    /// Acquire `volume` of `symbol` at its latest observed price.
    ///
    /// Fails when the symbol has never traded or the volume is not
    /// positive. Returns the resulting holding (new or merged).
    pub fn acquire(
        &self,
        symbol: &str,
        volume: Volume,
        prices: &PriceTable,
    ) -> PortfolioResult<Holding> {
        if !volume.is_positive() {
            return Err(PortfolioError::InvalidVolume(volume.to_string()));
        }
        let record = prices
            .get(symbol)
            .ok_or_else(|| PortfolioError::PriceUnavailable(symbol.to_string()))?;

        let mut holdings = self.holdings.write();
        let holding = match holdings.iter_mut().find(|h| h.symbol == symbol) {
            Some(existing) => {
                existing.merge_acquisition(record.price, volume)?;
                existing.clone()
            }
            None => {
                let holding = Holding::new(symbol, record.price, volume)?;
                holdings.push(holding.clone());
                holding
            }
        };

        info!(
            symbol = %holding.symbol,
            price = %holding.average_purchase_price,
            volume = %holding.volume,
            "Holding acquired"
        );
        Ok(holding)
    }

    /// Remove the holding with the given id. A no-op when absent.
    pub fn release(&self, id: &str) -> bool {
        let mut holdings = self.holdings.write();
        let before = holdings.len();
        holdings.retain(|h| h.id != id);
        let removed = holdings.len() < before;
        if removed {
            info!(id, "Holding released");
        }
        removed
    }

    /// Value every holding against the latest-price table.
    pub fn valuate(&self, prices: &PriceTable) -> PortfolioValuation {
        let holdings = self.holdings.read();

        let positions: Vec<ValuedHolding> = holdings
            .iter()
            .map(|holding| {
                let current_price = prices
                    .get(&holding.symbol)
                    .map(|r| r.price)
                    .unwrap_or(holding.average_purchase_price);

                let total_value = holding.volume.notional(current_price);
                let profit_loss = total_value - holding.cost_basis();
                let profit_loss_percent = current_price
                    .pct_change_from(holding.average_purchase_price)
                    .map(round_percent)
                    .unwrap_or(Decimal::ZERO);

                ValuedHolding {
                    holding: holding.clone(),
                    current_price,
                    total_value,
                    profit_loss,
                    profit_loss_percent,
                }
            })
            .collect();

        let total_value = positions.iter().map(|p| p.total_value).sum();
        let total_profit_loss = positions.iter().map(|p| p.profit_loss).sum();

        PortfolioValuation {
            positions,
            total_value,
            total_profit_loss,
        }
    }

    /// Snapshot of the raw holdings, for persistence.
    pub fn holdings(&self) -> Vec<Holding> {
        self.holdings.read().clone()
    }

    pub fn len(&self) -> usize {
        self.holdings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.read().is_empty()
    }

    pub fn clear(&self) {
        self.holdings.write().clear();
    }
}

impl Default for PortfolioBook {
    fn default() -> Self {
        Self::new()
    }
}
