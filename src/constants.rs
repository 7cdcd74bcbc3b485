//! Unit and Pricing Constants
//!
//! Defines the mass-unit conversions and the retail margin schedule used to
//! turn international spot quotes into Nepal-market retail prices.
//!
//! ## Margin model
//!
//! A retail quote is the spot-derived NPR/gram value with a percentage
//! markup plus a flat per-tola surcharge:
//!
//! | Metal  | Markup | Flat surcharge (NPR/tola) |
//! |--------|--------|---------------------------|
//! | GOLD   | 10%    | 5,000                     |
//! | SILVER | 16%    | 50                        |
//!
//! The flat surcharge is pre-divided into per-gram terms before rounding,
//! so the gram and tola quotes stay consistent.

/// Grams per troy ounce (the metals-trading ounce, not avoirdupois)
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

/// Grams per tola, the standard retail unit for precious metals in Nepal
pub const GRAMS_PER_TOLA: f64 = 11.664;

/// Gold percentage markup applied to the unmargined NPR/gram value
pub const GOLD_MARKUP_FACTOR: f64 = 1.10;

/// Gold flat surcharge in NPR per tola
pub const GOLD_FLAT_SURCHARGE_NPR_PER_TOLA: f64 = 5000.0;

/// Silver percentage markup applied to the unmargined NPR/gram value
pub const SILVER_MARKUP_FACTOR: f64 = 1.16;

/// Silver flat surcharge in NPR per tola
pub const SILVER_FLAT_SURCHARGE_NPR_PER_TOLA: f64 = 50.0;

/// How far back the charted history window reaches
pub const HISTORY_WINDOW_DAYS: i64 = 30;

/// Maximum age of a cached metal series before a non-forced refresh
/// re-fetches it (30 minutes)
pub const SERIES_CACHE_TTL_SECS: i64 = 1800;

/// Default background refresh interval (15 minutes)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 900;

/// Deployment-configurable refresh interval bounds (10 to 30 minutes)
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 600;
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 1800;

/// Bounded wait for any single upstream request
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header the history provider expects its credential in
pub const HISTORY_AUTH_HEADER: &str = "x-access-token";

/// Default exchange-rate provider base URL (key is appended as a path
/// segment: `{base}/{key}/latest/USD`)
pub const DEFAULT_RATE_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";

/// Default port for the API server
pub const DEFAULT_PORT: u16 = 8765;
