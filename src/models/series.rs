use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DerivedPricePoint, MetalSymbol};

/// Converted 30-day price history for one metal.
///
/// Replaced wholesale on every successful refresh, never mutated in place.
/// Non-empty by construction: an empty result after filtering is a fetch
/// failure, not a valid series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetalSeries {
    pub symbol: MetalSymbol,

    /// Points in strictly ascending date order, no duplicate dates
    pub points: Vec<DerivedPricePoint>,

    /// When this series was fetched and converted
    #[serde(with = "chrono::serde::ts_seconds")]
    pub fetched_at: DateTime<Utc>,
}

impl MetalSeries {
    /// Whether this series is younger than `ttl_secs` at `now`
    pub fn is_fresh(&self, ttl_secs: i64, now: DateTime<Utc>) -> bool {
        now - self.fetched_at < Duration::seconds(ttl_secs)
    }

    /// Most recent point, if any
    pub fn latest(&self) -> Option<&DerivedPricePoint> {
        self.points.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SERIES_CACHE_TTL_SECS;

    fn series_fetched_secs_ago(age_secs: i64) -> MetalSeries {
        MetalSeries {
            symbol: MetalSymbol::Gold,
            points: Vec::new(),
            fetched_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn freshness_respects_ttl() {
        let now = Utc::now();
        assert!(series_fetched_secs_ago(10).is_fresh(SERIES_CACHE_TTL_SECS, now));
        assert!(series_fetched_secs_ago(SERIES_CACHE_TTL_SECS - 60).is_fresh(SERIES_CACHE_TTL_SECS, now));
        assert!(!series_fetched_secs_ago(SERIES_CACHE_TTL_SECS + 60).is_fresh(SERIES_CACHE_TTL_SECS, now));
    }
}
