//! Refresh Orchestrator
//!
//! Coordinates the whole pipeline on every trigger (startup hydrate, timer
//! tick, manual request): decide per data source whether the cache is still
//! usable, fetch what is stale through the Upstream Gateway, convert and
//! reconcile, republish into the cache, and expose a presentation snapshot.
//!
//! Each data source (the rate, and each metal's series) runs a small state
//! machine: IDLE -> FETCHING -> { READY, FAILED }. FAILED is never terminal;
//! the next trigger re-attempts, and last-known-good data stays visible the
//! whole time.
//!
//! Within one cycle the exchange rate is resolved exactly once and both
//! metals derive from that same value. A per-metal mutex keeps refreshes for
//! the same metal from running concurrently: a second trigger waits, then
//! finds the freshly-written cache.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::models::{ExchangeRate, MetalSeries, MetalSymbol, RefreshConfig};
use crate::services::cache_store::SharedCacheStore;
use crate::services::gateway::UpstreamGateway;
use crate::services::reconcile::reconcile;

/// Lifecycle of one data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Idle,
    Fetching,
    Ready,
    Failed,
}

/// Observable state of one data source
#[derive(Debug, Clone, Serialize)]
pub struct SourceState {
    pub status: SourceStatus,
    pub last_error: Option<String>,
    pub last_refreshed_at: Option<String>,
}

impl Default for SourceState {
    fn default() -> Self {
        Self {
            status: SourceStatus::Idle,
            last_error: None,
            last_refreshed_at: None,
        }
    }
}

/// Worker statistics surfaced through /health
#[derive(Clone, Debug, Serialize)]
pub struct HealthStats {
    pub refresh_iteration_count: u64,
    pub last_refresh_cycle: Option<String>,
    pub refresh_interval_secs: u64,
    pub uptime_secs: u64,
    pub current_system_time: String,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            refresh_iteration_count: 0,
            last_refresh_cycle: None,
            refresh_interval_secs: 0,
            uptime_secs: 0,
            current_system_time: Utc::now().to_rfc3339(),
        }
    }
}

pub type SharedHealthStats = Arc<RwLock<HealthStats>>;

/// Per-metal slice of the presentation snapshot
#[derive(Debug, Serialize)]
pub struct MetalReport {
    pub symbol: MetalSymbol,
    pub label: &'static str,
    pub chart_color: &'static str,
    pub status: SourceStatus,
    pub error: Option<String>,
    pub last_refreshed_at: Option<String>,
    /// Current series, or last-known-good when the latest refresh failed
    pub series: Option<MetalSeries>,
}

/// Presentation output contract: everything a chart/table renderer needs
#[derive(Debug, Serialize)]
pub struct PriceBoard {
    pub rate: Option<ExchangeRate>,
    pub rate_status: SourceState,
    pub metals: Vec<MetalReport>,
    pub generated_at: String,
}

pub type SharedRefresher = Arc<Refresher>;

pub struct Refresher {
    gateway: Arc<dyn UpstreamGateway>,
    cache: SharedCacheStore,
    config: RefreshConfig,
    rate_state: RwLock<SourceState>,
    gold_state: RwLock<SourceState>,
    silver_state: RwLock<SourceState>,
    gold_lock: Mutex<()>,
    silver_lock: Mutex<()>,
}

impl Refresher {
    pub fn new(
        gateway: Arc<dyn UpstreamGateway>,
        cache: SharedCacheStore,
        config: RefreshConfig,
    ) -> Self {
        Self {
            gateway,
            cache,
            config,
            rate_state: RwLock::new(SourceState::default()),
            gold_state: RwLock::new(SourceState::default()),
            silver_state: RwLock::new(SourceState::default()),
            gold_lock: Mutex::new(()),
            silver_lock: Mutex::new(()),
        }
    }

    fn metal_state(&self, symbol: MetalSymbol) -> &RwLock<SourceState> {
        match symbol {
            MetalSymbol::Gold => &self.gold_state,
            MetalSymbol::Silver => &self.silver_state,
        }
    }

    fn metal_lock(&self, symbol: MetalSymbol) -> &Mutex<()> {
        match symbol {
            MetalSymbol::Gold => &self.gold_lock,
            MetalSymbol::Silver => &self.silver_lock,
        }
    }

    /// Load persisted cache entries and surface them as READY.
    pub async fn hydrate(&self) {
        self.cache.hydrate().await;

        if let Some(rate) = self.cache.cached_rate().await {
            let mut state = self.rate_state.write().await;
            state.status = SourceStatus::Ready;
            state.last_refreshed_at = Some(rate.fetched_at.to_rfc3339());
        }

        for symbol in MetalSymbol::ALL {
            if let Some(series) = self.cache.cached_series(symbol).await {
                let mut state = self.metal_state(symbol).write().await;
                state.status = SourceStatus::Ready;
                state.last_refreshed_at = Some(series.fetched_at.to_rfc3339());
            }
        }
    }

    /// Run one refresh cycle for every data source.
    ///
    /// `force` bypasses the series TTL (timer tick, manual refresh). A
    /// still-valid exchange rate is reused either way; its provider-declared
    /// expiry is the only thing that retires it.
    pub async fn refresh_all(&self, force: bool) {
        let rate = match self.resolve_rate().await {
            Ok(rate) => rate,
            Err(message) => {
                // Without a usable rate neither metal can derive; both keep
                // their last-known-good series and surface the failure.
                error!(error = %message, "Refresh cycle has no usable exchange rate");
                for symbol in MetalSymbol::ALL {
                    self.set_metal_state(
                        symbol,
                        SourceStatus::Failed,
                        Some(format!("exchange rate unavailable: {}", message)),
                        None,
                    )
                    .await;
                }
                return;
            }
        };

        for symbol in MetalSymbol::ALL {
            self.refresh_metal(symbol, &rate, force).await;
        }
    }

    /// Return a still-valid cached rate, or fetch and store a new one.
    async fn resolve_rate(&self) -> std::result::Result<ExchangeRate, String> {
        let now = Utc::now();

        if let Some(rate) = self.cache.rate_if_valid(now).await {
            let mut state = self.rate_state.write().await;
            state.status = SourceStatus::Ready;
            state.last_error = None;
            state.last_refreshed_at = Some(rate.fetched_at.to_rfc3339());
            return Ok(rate);
        }

        self.set_rate_state(SourceStatus::Fetching, None, None).await;

        match self.gateway.fetch_exchange_rate().await {
            Ok(rate) => {
                self.cache.store_rate(rate.clone()).await;
                self.set_rate_state(SourceStatus::Ready, None, Some(rate.fetched_at))
                    .await;
                Ok(rate)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Exchange rate fetch failed");
                self.set_rate_state(SourceStatus::Failed, Some(message.clone()), None)
                    .await;
                Err(message)
            }
        }
    }

    async fn refresh_metal(&self, symbol: MetalSymbol, rate: &ExchangeRate, force: bool) {
        // At most one in-flight refresh per metal; a concurrent trigger
        // waits here and then sees the fresh cache below.
        let _guard = self.metal_lock(symbol).lock().await;

        let now = Utc::now();
        if !force {
            if let Some(series) = self
                .cache
                .series_if_fresh(symbol, self.config.series_ttl_secs, now)
                .await
            {
                self.set_metal_state(
                    symbol,
                    SourceStatus::Ready,
                    None,
                    Some(series.fetched_at),
                )
                .await;
                return;
            }
        }

        self.set_metal_state(symbol, SourceStatus::Fetching, None, None)
            .await;

        let end = now;
        let start = end - chrono::Duration::days(self.config.history_window_days);

        let outcome = async {
            let raw = self.gateway.fetch_history(symbol, start, end).await?;
            let points = reconcile(raw, rate, symbol)?;
            Ok::<MetalSeries, crate::error::AppError>(MetalSeries {
                symbol,
                points,
                fetched_at: Utc::now(),
            })
        }
        .await;

        match outcome {
            Ok(series) => {
                info!(
                    %symbol,
                    points = series.points.len(),
                    "Series refreshed"
                );
                let fetched_at = series.fetched_at;
                self.cache.store_series(series).await;
                self.set_metal_state(symbol, SourceStatus::Ready, None, Some(fetched_at))
                    .await;
            }
            Err(e) => {
                // Previous cached series stays in place as last-known-good
                warn!(%symbol, error = %e, "Series refresh failed");
                self.set_metal_state(symbol, SourceStatus::Failed, Some(e.to_string()), None)
                    .await;
            }
        }
    }

    async fn set_rate_state(
        &self,
        status: SourceStatus,
        error: Option<String>,
        refreshed_at: Option<DateTime<Utc>>,
    ) {
        let mut state = self.rate_state.write().await;
        state.status = status;
        state.last_error = error;
        if let Some(ts) = refreshed_at {
            state.last_refreshed_at = Some(ts.to_rfc3339());
        }
    }

    async fn set_metal_state(
        &self,
        symbol: MetalSymbol,
        status: SourceStatus,
        error: Option<String>,
        refreshed_at: Option<DateTime<Utc>>,
    ) {
        let mut state = self.metal_state(symbol).write().await;
        state.status = status;
        state.last_error = error;
        if let Some(ts) = refreshed_at {
            state.last_refreshed_at = Some(ts.to_rfc3339());
        }
    }

    /// Build the presentation snapshot: per metal the cached series (or
    /// last-known-good), source state, and the active rate.
    pub async fn snapshot(&self) -> PriceBoard {
        let mut metals = Vec::with_capacity(MetalSymbol::ALL.len());

        for symbol in MetalSymbol::ALL {
            let state = self.metal_state(symbol).read().await.clone();
            metals.push(MetalReport {
                symbol,
                label: symbol.label(),
                chart_color: symbol.chart_color(),
                status: state.status,
                error: state.last_error,
                last_refreshed_at: state.last_refreshed_at,
                series: self.cache.cached_series(symbol).await,
            });
        }

        PriceBoard {
            rate: self.cache.cached_rate().await,
            rate_status: self.rate_state.read().await.clone(),
            metals,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}
