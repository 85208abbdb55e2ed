//! Trade reconciliation for the fxwatch forex tracker.
//!
//! Folds incoming trade batches into a per-symbol latest-price table,
//! annotating each update with its change against the previous price.

pub mod reconciler;
pub mod stats;

pub use reconciler::PriceTable;
pub use stats::ReconcileStats;
