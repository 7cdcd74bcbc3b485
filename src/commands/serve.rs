use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::models::RefreshConfig;
use crate::server::{self, AppState};
use crate::services::{CacheStore, HealthStats, LiveGateway, Refresher, SharedHealthStats, UpstreamGateway};
use crate::worker;

pub async fn run(port: u16) {
    println!("🚀 Starting sunchandi server on port {}", port);

    let config = match RefreshConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            RefreshConfig::print_config_help();
            std::process::exit(1);
        }
    };

    println!("📁 Cache directory: {}", config.cache_dir.display());
    println!(
        "⏱️  Refresh interval: {}s, series TTL: {}s",
        config.refresh_interval.as_secs(),
        config.series_ttl_secs
    );
    println!(
        "🔑 History credentials configured: {}",
        config.history_api_keys.len()
    );

    let cache = Arc::new(CacheStore::new(config.cache_dir.clone()));

    let gateway = match LiveGateway::from_config(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    let history = gateway.history_client();

    let refresher = Arc::new(Refresher::new(
        Arc::new(gateway) as Arc<dyn UpstreamGateway>,
        cache,
        config.clone(),
    ));

    // Surface whatever survived the last run before the first fetch
    refresher.hydrate().await;
    let board = refresher.snapshot().await;
    for metal in &board.metals {
        match &metal.series {
            Some(series) => println!(
                "💾 {} cache: {} points, fetched {}",
                metal.label,
                series.points.len(),
                series.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!("💾 {} cache: empty", metal.label),
        }
    }

    let health_stats: SharedHealthStats = Arc::new(RwLock::new(HealthStats::default()));

    println!("🔄 Spawning background refresh worker...");
    tokio::spawn(worker::run_refresh_worker(
        refresher.clone(),
        health_stats.clone(),
        config.refresh_interval,
    ));

    let state = AppState {
        refresher,
        history,
        health_stats,
        started_at: Instant::now(),
    };

    if let Err(e) = server::serve(state, port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
