use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day as reported by the history provider, before conversion.
///
/// Malformed upstream prices are carried here as non-finite values and are
/// discarded during reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPricePoint {
    /// Calendar day, no time component
    pub date: NaiveDate,

    /// Spot price in USD per troy ounce
    pub spot_price_usd: f64,
}

/// One trading day converted into Nepal-market retail pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedPricePoint {
    /// Calendar day, serialized as YYYY-MM-DD
    pub date: NaiveDate,

    /// Upstream spot price in USD per troy ounce
    pub spot_price_usd: f64,

    /// Retail price in NPR per gram (margined, rounded)
    pub price_per_gram_npr: i64,

    /// Retail price in NPR per tola (margined, rounded)
    pub price_per_tola_npr: i64,

    /// Day-over-day change of the tola price in percent; 0 for the first
    /// point of a series
    pub percent_change: f64,
}
