use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_RATE_BASE_URL, DEFAULT_REFRESH_INTERVAL_SECS, HISTORY_WINDOW_DAYS,
    MAX_REFRESH_INTERVAL_SECS, MIN_REFRESH_INTERVAL_SECS, REQUEST_TIMEOUT_SECS,
    SERIES_CACHE_TTL_SECS,
};
use crate::error::{Error, Result};
use crate::utils::get_cache_dir;

/// Configuration for the refresh pipeline, loaded from the environment.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Base URL of the metal history provider
    pub history_base_url: String,

    /// Ordered credential list for the history provider; order defines the
    /// rotation order on 401/403/429
    pub history_api_keys: Vec<String>,

    /// Base URL of the exchange-rate provider
    pub rate_base_url: String,

    /// Exchange-rate provider API key (single, appended as a path segment)
    pub rate_api_key: String,

    /// Directory for the persisted cache entries
    pub cache_dir: PathBuf,

    /// Interval between forced background refresh cycles
    pub refresh_interval: Duration,

    /// Maximum age of a cached series before a non-forced refresh re-fetches
    pub series_ttl_secs: i64,

    /// How far back the history window reaches
    pub history_window_days: i64,

    /// Bounded wait for any single upstream request
    pub request_timeout: Duration,
}

impl RefreshConfig {
    /// Load configuration from environment variables.
    ///
    /// Required: `HISTORY_BASE_URL`, `HISTORY_API_KEYS` (comma-separated),
    /// `RATE_API_KEY`. Optional: `RATE_BASE_URL`, `CACHE_DIR`,
    /// `REFRESH_INTERVAL_SECS` (clamped to the supported 10-30 minute range).
    pub fn from_env() -> Result<Self> {
        let history_base_url = required_env_var("HISTORY_BASE_URL")?;

        let history_api_keys = parse_api_keys(&required_env_var("HISTORY_API_KEYS")?);
        if history_api_keys.is_empty() {
            return Err(Error::Config(
                "HISTORY_API_KEYS must contain at least one key".to_string(),
            ));
        }

        let rate_api_key = required_env_var("RATE_API_KEY")?;

        let rate_base_url = std::env::var("RATE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_RATE_BASE_URL.to_string());

        let refresh_interval_secs = match std::env::var("REFRESH_INTERVAL_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|e| {
                    Error::Config(format!("REFRESH_INTERVAL_SECS parse failed: {}", e))
                })?;
                clamp_refresh_interval(secs)
            }
            Err(_) => DEFAULT_REFRESH_INTERVAL_SECS,
        };

        Ok(Self {
            history_base_url,
            history_api_keys,
            rate_base_url,
            rate_api_key,
            cache_dir: get_cache_dir(),
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            series_ttl_secs: SERIES_CACHE_TTL_SECS,
            history_window_days: HISTORY_WINDOW_DAYS,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn print_config_help() {
        println!("\n🔧 Configuration");
        println!("{}", "=".repeat(50));
        println!("Required environment variables:\n");
        println!("HISTORY_BASE_URL=https://<history-provider>");
        println!("HISTORY_API_KEYS=key1,key2,key3");
        println!("RATE_API_KEY=<exchange-rate-api key>\n");
        println!("Optional:\n");
        println!("RATE_BASE_URL={}", DEFAULT_RATE_BASE_URL);
        println!("CACHE_DIR=cache");
        println!(
            "REFRESH_INTERVAL_SECS={} (clamped to {}-{})",
            DEFAULT_REFRESH_INTERVAL_SECS, MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS
        );
        println!("PUBLIC_DIR=public");
        println!("{}", "=".repeat(50));
    }
}

/// Split a comma-separated credential list, dropping empty segments
pub fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Clamp a configured refresh interval to the supported deployment range
pub fn clamp_refresh_interval(secs: u64) -> u64 {
    secs.clamp(MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS)
}

fn required_env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::Config(format!("missing required {}", key)))
}
