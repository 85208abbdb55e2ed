//! Portfolio error types.

use fxwatch_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("No observed price for symbol: {0}")]
    PriceUnavailable(String),

    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type PortfolioResult<T> = Result<T, PortfolioError>;
