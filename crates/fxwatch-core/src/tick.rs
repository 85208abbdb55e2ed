//! Market data types: wire ticks and reconciled price records.

use crate::decimal::{Price, Volume};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single trade tick as carried on the wire.
///
/// Field names follow the feed's compact JSON encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Instrument symbol, e.g. `OANDA:EUR_USD`.
    #[serde(rename = "s")]
    pub symbol: String,

    /// Last trade price.
    #[serde(rename = "p")]
    pub price: Price,

    /// Trade timestamp, milliseconds since the Unix epoch.
    #[serde(rename = "t")]
    pub timestamp_ms: i64,

    /// Trade volume.
    #[serde(rename = "v")]
    pub volume: Volume,

    /// Trade conditions, when the feed supplies them.
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
}

/// Direction of the latest price move for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    /// No move yet, or the price is unchanged.
    #[default]
    None,
}

impl Direction {
    /// Classify a price change. `None` (no prior price) and zero both map
    /// to `Direction::None`.
    pub fn from_change(change_percent: Option<Decimal>) -> Self {
        match change_percent {
            Some(c) if c.is_sign_positive() && !c.is_zero() => Self::Up,
            Some(c) if c.is_sign_negative() && !c.is_zero() => Self::Down,
            _ => Self::None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::None => write!(f, "none"),
        }
    }
}

/// The reconciled latest-price view for one instrument.
///
/// Produced by folding trade ticks into a per-symbol table; carries the
/// tick fields plus change-versus-previous annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub symbol: String,
    pub price: Price,
    pub timestamp_ms: i64,
    pub volume: Volume,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,

    /// Percentage change against the previously recorded price.
    /// `None` until the instrument has been seen more than once.
    pub change_percent: Option<Decimal>,
    pub direction: Direction,
}

impl PriceRecord {
    /// Build a record from a tick with a known change annotation.
    pub fn new(tick: Tick, change_percent: Option<Decimal>) -> Self {
        Self {
            direction: Direction::from_change(change_percent),
            symbol: tick.symbol,
            price: tick.price,
            timestamp_ms: tick.timestamp_ms,
            volume: tick.volume,
            conditions: tick.conditions,
            change_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tick(symbol: &str, price: Decimal) -> Tick {
        Tick {
            symbol: symbol.to_string(),
            price: Price::new(price),
            timestamp_ms: 1_700_000_000_000,
            volume: Volume::new(dec!(1)),
            conditions: None,
        }
    }

    #[test]
    fn test_tick_deserialization() {
        let json = r#"{"s":"OANDA:EUR_USD","p":1.0935,"t":1700000000000,"v":0.5,"c":["1"]}"#;
        let t: Tick = serde_json::from_str(json).unwrap();

        assert_eq!(t.symbol, "OANDA:EUR_USD");
        assert_eq!(t.price, Price::new(dec!(1.0935)));
        assert_eq!(t.timestamp_ms, 1_700_000_000_000);
        assert_eq!(t.volume, Volume::new(dec!(0.5)));
        assert_eq!(t.conditions, Some(vec!["1".to_string()]));
    }

    #[test]
    fn test_tick_without_conditions() {
        let json = r#"{"s":"OANDA:GBP_USD","p":1.27,"t":1700000000000,"v":1}"#;
        let t: Tick = serde_json::from_str(json).unwrap();
        assert!(t.conditions.is_none());
    }

    #[test]
    fn test_direction_from_change() {
        assert_eq!(Direction::from_change(Some(dec!(0.455))), Direction::Up);
        assert_eq!(Direction::from_change(Some(dec!(-0.226))), Direction::Down);
        assert_eq!(Direction::from_change(Some(dec!(0))), Direction::None);
        assert_eq!(Direction::from_change(None), Direction::None);
    }

    #[test]
    fn test_first_record_has_no_change() {
        let rec = PriceRecord::new(tick("OANDA:EUR_USD", dec!(1.1000)), None);
        assert!(rec.change_percent.is_none());
        assert_eq!(rec.direction, Direction::None);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Down.to_string(), "down");
        assert_eq!(Direction::None.to_string(), "none");
    }
}
