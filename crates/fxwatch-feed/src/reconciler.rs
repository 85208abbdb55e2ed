//! Latest-price table.
//!
//! Folds trade batches into a per-symbol table where each entry is the
//! most recent tick annotated with its change against the entry it
//! replaced.

use fxwatch_core::{round_percent, PriceRecord, Tick};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::stats::ReconcileStats;

/// Shared latest-price table keyed by symbol.
pub struct PriceTable {
    records: RwLock<HashMap<String, PriceRecord>>,
    stats: Arc<ReconcileStats>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            stats: Arc::new(ReconcileStats::default()),
        }
    }

    /// Fold a trade batch into the table.
    ///
    /// Each tick replaces its symbol's entry unconditionally, even when
    /// the price is unchanged. The change annotation is relative to the
    /// replaced entry: absent on first sight, zero when the previous
    /// price was zero, otherwise a percentage rounded to 3 digits.
    /// Later ticks in a batch see the effects of earlier ones.
    pub fn apply_batch(&self, batch: Vec<Tick>) {
        let count = batch.len();
        let mut records = self.records.write();

        for tick in batch {
            let change = records.get(&tick.symbol).map(|prev| {
                tick.price
                    .pct_change_from(prev.price)
                    .map(round_percent)
                    .unwrap_or(Decimal::ZERO)
            });

            let record = PriceRecord::new(tick, change);
            debug!(
                symbol = %record.symbol,
                price = %record.price,
                direction = %record.direction,
                "Price updated"
            );
            records.insert(record.symbol.clone(), record);
        }

        self.stats.record_applied(count);
    }

    /// Latest record for a symbol.
    pub fn get(&self, symbol: &str) -> Option<PriceRecord> {
        self.records.read().get(symbol).cloned()
    }

    /// All records, most recently traded first.
    pub fn snapshot(&self) -> Vec<PriceRecord> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        records
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Drop all records.
    pub fn clear(&self) {
        self.records.write().clear();
    }

    pub fn stats(&self) -> &ReconcileStats {
        &self.stats
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxwatch_core::{Direction, Price, Volume};
    use rust_decimal_macros::dec;

    fn tick(symbol: &str, price: Decimal, timestamp_ms: i64) -> Tick {
        Tick {
            symbol: symbol.to_string(),
            price: Price::new(price),
            timestamp_ms,
            volume: Volume::new(dec!(1)),
            conditions: None,
        }
    }

    #[test]
    fn test_first_tick_has_no_change() {
        let table = PriceTable::new();
        table.apply_batch(vec![tick("OANDA:EUR_USD", dec!(1.1000), 1)]);

        let rec = table.get("OANDA:EUR_USD").unwrap();
        assert!(rec.change_percent.is_none());
        assert_eq!(rec.direction, Direction::None);
    }

    #[test]
    fn test_change_and_direction_sequence() {
        let table = PriceTable::new();

        table.apply_batch(vec![tick("OANDA:EUR_USD", dec!(1.1000), 1)]);
        table.apply_batch(vec![tick("OANDA:EUR_USD", dec!(1.1050), 2)]);

        let rec = table.get("OANDA:EUR_USD").unwrap();
        assert_eq!(rec.change_percent, Some(dec!(0.455)));
        assert_eq!(rec.direction, Direction::Up);

        table.apply_batch(vec![tick("OANDA:EUR_USD", dec!(1.1025), 3)]);
        let rec = table.get("OANDA:EUR_USD").unwrap();
        assert_eq!(rec.change_percent, Some(dec!(-0.226)));
        assert_eq!(rec.direction, Direction::Down);
    }

    #[test]
    fn test_unchanged_price_still_replaces_entry() {
        let table = PriceTable::new();
        table.apply_batch(vec![tick("OANDA:EUR_USD", dec!(1.1000), 1)]);
        table.apply_batch(vec![tick("OANDA:EUR_USD", dec!(1.1000), 2)]);

        let rec = table.get("OANDA:EUR_USD").unwrap();
        assert_eq!(rec.timestamp_ms, 2);
        assert_eq!(rec.change_percent, Some(dec!(0.000)));
        assert_eq!(rec.direction, Direction::None);
    }

    #[test]
    fn test_zero_previous_price_yields_zero_change() {
        let table = PriceTable::new();
        table.apply_batch(vec![tick("ODD:ZERO", dec!(0), 1)]);
        table.apply_batch(vec![tick("ODD:ZERO", dec!(1.5), 2)]);

        let rec = table.get("ODD:ZERO").unwrap();
        assert_eq!(rec.change_percent, Some(dec!(0)));
        assert_eq!(rec.direction, Direction::None);
    }

    #[test]
    fn test_within_batch_fold() {
        let table = PriceTable::new();
        table.apply_batch(vec![
            tick("OANDA:EUR_USD", dec!(1.1000), 1),
            tick("OANDA:EUR_USD", dec!(1.1050), 2),
        ]);

        // Second tick is reconciled against the first within the same batch.
        let rec = table.get("OANDA:EUR_USD").unwrap();
        assert_eq!(rec.change_percent, Some(dec!(0.455)));
        assert_eq!(rec.direction, Direction::Up);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_snapshot_most_recent_first() {
        let table = PriceTable::new();
        table.apply_batch(vec![
            tick("OANDA:EUR_USD", dec!(1.1000), 100),
            tick("OANDA:GBP_USD", dec!(1.2700), 300),
            tick("OANDA:USD_JPY", dec!(149.50), 200),
        ]);

        let snap = table.snapshot();
        let symbols: Vec<_> = snap.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["OANDA:GBP_USD", "OANDA:USD_JPY", "OANDA:EUR_USD"]);
    }

    #[test]
    fn test_clear() {
        let table = PriceTable::new();
        table.apply_batch(vec![tick("OANDA:EUR_USD", dec!(1.1000), 1)]);
        assert!(!table.is_empty());

        table.clear();
        assert!(table.is_empty());
        assert!(table.get("OANDA:EUR_USD").is_none());
    }

    #[test]
    fn test_stats_track_batches() {
        let table = PriceTable::new();
        table.apply_batch(vec![
            tick("OANDA:EUR_USD", dec!(1.1), 1),
            tick("OANDA:GBP_USD", dec!(1.27), 2),
        ]);
        table.stats().record_dropped();

        assert_eq!(table.stats().applied(), 1);
        assert_eq!(table.stats().ticks(), 2);
        assert_eq!(table.stats().dropped(), 1);
    }
}
