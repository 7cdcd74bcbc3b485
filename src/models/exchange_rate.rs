use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// USD to NPR conversion rate, system-wide (not per-metal).
///
/// `valid_until` is authoritative and comes from the provider's
/// `time_next_update_unix` field; the cache never invents its own expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Nepali rupees per US dollar
    pub rate_npr_per_usd: f64,

    /// Provider-declared next-update time; the rate is reusable until then
    #[serde(with = "chrono::serde::ts_seconds")]
    pub valid_until: DateTime<Utc>,

    /// When this rate was fetched
    #[serde(with = "chrono::serde::ts_seconds")]
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRate {
    /// Whether this rate may still be reused at `now`
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn validity_follows_provider_expiry() {
        let now = Utc::now();
        let rate = ExchangeRate {
            rate_npr_per_usd: 144.5737,
            valid_until: now + Duration::hours(6),
            fetched_at: now,
        };

        assert!(rate.is_valid(now));
        assert!(rate.is_valid(now + Duration::hours(5)));
        assert!(!rate.is_valid(now + Duration::hours(6)));
        assert!(!rate.is_valid(now + Duration::days(2)));
    }
}
