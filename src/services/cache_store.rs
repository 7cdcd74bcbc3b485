//! Persisted Price Cache
//!
//! Two logical tables behind one store: the active exchange rate and one
//! series per metal. Entries live in memory behind `RwLock`s and are
//! mirrored to JSON files in the cache directory, so a restart comes back
//! with last-known-good data.
//!
//! Freshness rules:
//! - The exchange rate is reusable strictly while `now < valid_until`
//!   (provider-declared, never a local TTL)
//! - A series is reusable while it is younger than the series TTL
//!
//! A cache file that fails to parse is logged, deleted, and treated as
//! absent; corruption never surfaces past this module. Disk writes go
//! through a temp file and rename so no reader observes a half-written
//! entry.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{ExchangeRate, MetalSeries, MetalSymbol};

const RATE_CACHE_FILENAME: &str = "rate.json";

pub type SharedCacheStore = Arc<CacheStore>;

pub struct CacheStore {
    cache_dir: PathBuf,
    rate: RwLock<Option<ExchangeRate>>,
    series: RwLock<HashMap<MetalSymbol, MetalSeries>>,
}

impl CacheStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            rate: RwLock::new(None),
            series: RwLock::new(HashMap::new()),
        }
    }

    fn rate_path(&self) -> PathBuf {
        self.cache_dir.join(RATE_CACHE_FILENAME)
    }

    fn series_path(&self, symbol: MetalSymbol) -> PathBuf {
        self.cache_dir.join(symbol.cache_filename())
    }

    /// Load whatever the cache directory holds into memory.
    pub async fn hydrate(&self) {
        if let Err(e) = std::fs::create_dir_all(&self.cache_dir) {
            warn!(dir = %self.cache_dir.display(), error = %e, "Could not create cache directory");
            return;
        }

        if let Some(rate) = load_json::<ExchangeRate>(&self.rate_path()) {
            info!(
                rate = rate.rate_npr_per_usd,
                valid_until = %rate.valid_until,
                "Hydrated exchange rate from cache"
            );
            *self.rate.write().await = Some(rate);
        }

        let mut series = self.series.write().await;
        for symbol in MetalSymbol::ALL {
            if let Some(entry) = load_json::<MetalSeries>(&self.series_path(symbol)) {
                info!(
                    %symbol,
                    points = entry.points.len(),
                    fetched_at = %entry.fetched_at,
                    "Hydrated series from cache"
                );
                series.insert(symbol, entry);
            }
        }
    }

    /// Cached rate regardless of validity (for display beside its expiry)
    pub async fn cached_rate(&self) -> Option<ExchangeRate> {
        self.rate.read().await.clone()
    }

    /// Cached rate only while the provider-declared expiry has not passed
    pub async fn rate_if_valid(&self, now: DateTime<Utc>) -> Option<ExchangeRate> {
        self.rate
            .read()
            .await
            .as_ref()
            .filter(|rate| rate.is_valid(now))
            .cloned()
    }

    /// Replace the active rate in memory and on disk.
    pub async fn store_rate(&self, rate: ExchangeRate) {
        if let Err(e) = persist_json(&self.cache_dir, &self.rate_path(), &rate) {
            warn!(error = %e, "Failed to persist exchange rate; cache stays in memory");
        }
        *self.rate.write().await = Some(rate);
    }

    /// Cached series regardless of age (last-known-good for display)
    pub async fn cached_series(&self, symbol: MetalSymbol) -> Option<MetalSeries> {
        self.series.read().await.get(&symbol).cloned()
    }

    /// Cached series only while it is younger than `ttl_secs`
    pub async fn series_if_fresh(
        &self,
        symbol: MetalSymbol,
        ttl_secs: i64,
        now: DateTime<Utc>,
    ) -> Option<MetalSeries> {
        self.series
            .read()
            .await
            .get(&symbol)
            .filter(|series| series.is_fresh(ttl_secs, now))
            .cloned()
    }

    /// Replace one metal's series in memory and on disk.
    pub async fn store_series(&self, series: MetalSeries) {
        let path = self.series_path(series.symbol);
        if let Err(e) = persist_json(&self.cache_dir, &path, &series) {
            warn!(symbol = %series.symbol, error = %e, "Failed to persist series; cache stays in memory");
        }
        self.series.write().await.insert(series.symbol, series);
    }
}

/// Read and parse one cache file. A corrupt entry is deleted and treated as
/// absent.
fn load_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => {
            debug!(path = %path.display(), "No cache entry on disk");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Discarding corrupt cache entry");
            if let Err(remove_err) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %remove_err, "Could not remove corrupt cache entry");
            }
            None
        }
    }
}

/// Write a cache entry via temp file + rename.
fn persist_json<T: Serialize>(cache_dir: &Path, path: &Path, value: &T) -> Result<()> {
    std::fs::create_dir_all(cache_dir)?;

    let payload = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, payload)?;
    std::fs::rename(&tmp_path, path)
        .map_err(|e| AppError::Io(format!("rename {}: {}", path.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SERIES_CACHE_TTL_SECS;
    use crate::models::DerivedPricePoint;
    use chrono::{Duration, NaiveDate};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_cache_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("sunchandi-{}-{}-{}", tag, std::process::id(), nanos))
    }

    fn sample_rate(valid_for_hours: i64) -> ExchangeRate {
        ExchangeRate {
            rate_npr_per_usd: 144.5737,
            valid_until: Utc::now() + Duration::hours(valid_for_hours),
            fetched_at: Utc::now(),
        }
    }

    fn sample_series(symbol: MetalSymbol, age_secs: i64) -> MetalSeries {
        MetalSeries {
            symbol,
            points: vec![DerivedPricePoint {
                date: NaiveDate::parse_from_str("2025-08-01", "%Y-%m-%d").unwrap(),
                spot_price_usd: 4994.50,
                price_per_gram_npr: 25965,
                price_per_tola_npr: 302856,
                percent_change: 0.0,
            }],
            fetched_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn series_ttl_governs_reuse() {
        let store = CacheStore::new(temp_cache_dir("ttl"));
        let now = Utc::now();

        store.store_series(sample_series(MetalSymbol::Gold, 60)).await;
        assert!(store
            .series_if_fresh(MetalSymbol::Gold, SERIES_CACHE_TTL_SECS, now)
            .await
            .is_some());

        store
            .store_series(sample_series(MetalSymbol::Gold, SERIES_CACHE_TTL_SECS + 60))
            .await;
        assert!(store
            .series_if_fresh(MetalSymbol::Gold, SERIES_CACHE_TTL_SECS, now)
            .await
            .is_none());
        // Stale data is still available as last-known-good
        assert!(store.cached_series(MetalSymbol::Gold).await.is_some());
    }

    #[tokio::test]
    async fn rate_reuse_follows_provider_expiry_only() {
        let store = CacheStore::new(temp_cache_dir("rate"));
        let now = Utc::now();

        store.store_rate(sample_rate(6)).await;
        assert!(store.rate_if_valid(now).await.is_some());

        store.store_rate(sample_rate(-1)).await;
        assert!(store.rate_if_valid(now).await.is_none());
        assert!(store.cached_rate().await.is_some());
    }

    #[tokio::test]
    async fn entries_survive_a_restart() {
        let dir = temp_cache_dir("restart");

        let store = CacheStore::new(dir.clone());
        store.hydrate().await;
        store.store_rate(sample_rate(6)).await;
        store.store_series(sample_series(MetalSymbol::Silver, 0)).await;

        let reopened = CacheStore::new(dir);
        reopened.hydrate().await;

        let rate = reopened.cached_rate().await.unwrap();
        assert_eq!(rate.rate_npr_per_usd, 144.5737);
        let series = reopened.cached_series(MetalSymbol::Silver).await.unwrap();
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].price_per_tola_npr, 302856);
    }

    #[tokio::test]
    async fn corrupt_entries_are_discarded_silently() {
        let dir = temp_cache_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(RATE_CACHE_FILENAME), "{ not json").unwrap();
        std::fs::write(
            dir.join(MetalSymbol::Gold.cache_filename()),
            "also not json",
        )
        .unwrap();

        let store = CacheStore::new(dir.clone());
        store.hydrate().await;

        assert!(store.cached_rate().await.is_none());
        assert!(store.cached_series(MetalSymbol::Gold).await.is_none());
        // The corrupt files are gone, so the next hydrate starts clean
        assert!(!dir.join(RATE_CACHE_FILENAME).exists());
    }
}
