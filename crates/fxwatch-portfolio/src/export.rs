//! Delimited portfolio export.

use crate::valuator::PortfolioValuation;
use fxwatch_core::display_symbol;
use rust_decimal::{Decimal, RoundingStrategy};

const HEADER: &str =
    "Pair,Purchase Price,Current Price,Volume,Total Value,Profit/Loss,Profit/Loss %,Purchase Date";

/// Render a valuation as CSV.
///
/// One row per position: prices at 5 decimal digits, monetary totals at
/// 2, the profit/loss percentage at 3 with a `%` suffix, and the
/// purchase date as `YYYY-MM-DD`.
pub fn portfolio_csv(valuation: &PortfolioValuation) -> String {
    let mut out = String::with_capacity(HEADER.len() + valuation.positions.len() * 80);
    out.push_str(HEADER);
    out.push('\n');

    for pos in &valuation.positions {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}%,{}\n",
            display_symbol(&pos.holding.symbol),
            fixed(pos.holding.average_purchase_price.inner(), 5),
            fixed(pos.current_price.inner(), 5),
            pos.holding.volume,
            fixed(pos.total_value, 2),
            fixed(pos.profit_loss, 2),
            fixed(pos.profit_loss_percent, 3),
            pos.holding.purchase_date.format("%Y-%m-%d"),
        ));
    }

    out
}

/// Format with exactly `dp` decimal digits.
fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = dp as usize)
}
