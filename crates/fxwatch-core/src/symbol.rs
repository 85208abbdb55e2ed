//! Symbol formatting helpers.

/// Human-readable form of a feed symbol.
///
/// Strips the venue prefix and replaces the base/quote separator, so
/// `OANDA:EUR_USD` becomes `EUR/USD`. Symbols without a venue prefix or
/// separator pass through with whatever parts they do have.
pub fn display_symbol(symbol: &str) -> String {
    let stripped = match symbol.split_once(':') {
        Some((_, rest)) => rest,
        None => symbol,
    };
    stripped.replacen('_', "/", 1)
}
