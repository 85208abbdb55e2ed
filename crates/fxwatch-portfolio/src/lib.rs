//! Portfolio valuation for the fxwatch forex tracker.
//!
//! Tracks holdings acquired at observed feed prices, values them against
//! the latest-price table, and renders the delimited export.

pub mod error;
pub mod export;
pub mod valuator;

pub use error::{PortfolioError, PortfolioResult};
pub use export::portfolio_csv;
pub use valuator::{PortfolioBook, PortfolioValuation, ValuedHolding};
