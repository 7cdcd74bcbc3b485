use chrono::Utc;

use crate::constants::SERIES_CACHE_TTL_SECS;
use crate::models::MetalSymbol;
use crate::services::CacheStore;
use crate::utils::get_cache_dir;

/// Inspect the on-disk cache without touching the network.
pub async fn run() {
    println!("📊 Cache Status\n");

    let cache_dir = get_cache_dir();
    println!("📁 Cache directory: {}", cache_dir.display());

    let cache = CacheStore::new(cache_dir);
    cache.hydrate().await;

    let now = Utc::now();

    println!("\n═══════════════════════════════════════════\n");

    match cache.cached_rate().await {
        Some(rate) => {
            let validity = if rate.is_valid(now) {
                "valid".to_string()
            } else {
                format!("expired {}", rate.valid_until.format("%Y-%m-%d %H:%M UTC"))
            };
            println!("💱 USD/NPR: {:.4} ({})", rate.rate_npr_per_usd, validity);
        }
        None => println!("💱 USD/NPR: not cached"),
    }

    for symbol in MetalSymbol::ALL {
        println!();
        match cache.cached_series(symbol).await {
            Some(series) => {
                let freshness = if series.is_fresh(SERIES_CACHE_TTL_SECS, now) {
                    "fresh"
                } else {
                    "stale"
                };
                let range = match (series.points.first(), series.points.last()) {
                    (Some(first), Some(last)) => format!("{} → {}", first.date, last.date),
                    _ => "empty".to_string(),
                };
                println!("🔹 {} ({})", symbol.label(), freshness);
                println!("   {} points  ({})", series.points.len(), range);
                if let Some(latest) = series.latest() {
                    println!("   Latest: NPR {}/tola", latest.price_per_tola_npr);
                }
            }
            None => println!("🔹 {}: not cached", symbol.label()),
        }
    }

    println!("\n💡 Tip: run 'sunchandi pull' to refresh the cache");
}
