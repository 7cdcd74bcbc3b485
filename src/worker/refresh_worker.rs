use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument};

use crate::services::{SharedHealthStats, SharedRefresher};

/// Background refresh loop.
///
/// The first pass is non-forced, so it only fills what the startup hydrate
/// left missing or stale. Every later pass forces both metals' series,
/// which bounds staleness independent of the per-entry TTL. A still-valid
/// exchange rate is reused either way.
#[instrument(skip(refresher, health_stats))]
pub async fn run(
    refresher: SharedRefresher,
    health_stats: SharedHealthStats,
    interval: Duration,
) {
    info!(
        interval_secs = interval.as_secs(),
        "Starting refresh worker"
    );

    {
        let mut health = health_stats.write().await;
        health.refresh_interval_secs = interval.as_secs();
    }

    let mut iteration_count = 0u64;

    loop {
        iteration_count += 1;
        let loop_start = std::time::Instant::now();
        let force = iteration_count > 1;

        info!(
            iteration = iteration_count,
            force,
            "Refresh worker: starting cycle"
        );

        refresher.refresh_all(force).await;

        {
            let mut health = health_stats.write().await;
            health.refresh_iteration_count = iteration_count;
            health.last_refresh_cycle = Some(Utc::now().to_rfc3339());
        }

        info!(
            iteration = iteration_count,
            loop_duration_secs = loop_start.elapsed().as_secs_f64(),
            next_refresh_secs = interval.as_secs(),
            "Refresh worker: cycle completed"
        );

        sleep(interval).await;
    }
}
