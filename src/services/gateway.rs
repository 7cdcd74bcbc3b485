//! Upstream Gateway
//!
//! Seam between the refresh pipeline and the two network collaborators.
//! The orchestrator only sees this trait, so tests plug in doubles without
//! touching the network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{ExchangeRate, MetalSymbol, RawPricePoint, RefreshConfig};
use crate::services::exchange_rate_api::RateClient;
use crate::services::metal_history::HistoryClient;

#[async_trait]
pub trait UpstreamGateway: Send + Sync {
    /// Fetch raw per-day history for one metal over a date window.
    async fn fetch_history(
        &self,
        symbol: MetalSymbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawPricePoint>>;

    /// Fetch the current USD -> NPR exchange rate.
    async fn fetch_exchange_rate(&self) -> Result<ExchangeRate>;
}

/// Production gateway over the real providers
pub struct LiveGateway {
    history: Arc<HistoryClient>,
    rates: RateClient,
}

impl LiveGateway {
    pub fn from_config(config: &RefreshConfig) -> Result<Self> {
        let history = Arc::new(HistoryClient::new(
            config.history_base_url.clone(),
            config.history_api_keys.clone(),
            config.request_timeout,
        )?);
        let rates = RateClient::new(
            config.rate_base_url.clone(),
            config.rate_api_key.clone(),
            config.request_timeout,
        )?;

        Ok(Self { history, rates })
    }

    /// History client handle for the relay endpoint, which shares the
    /// credential rotation with the gateway
    pub fn history_client(&self) -> Arc<HistoryClient> {
        self.history.clone()
    }
}

#[async_trait]
impl UpstreamGateway for LiveGateway {
    async fn fetch_history(
        &self,
        symbol: MetalSymbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawPricePoint>> {
        self.history.fetch_history(symbol, start, end).await
    }

    async fn fetch_exchange_rate(&self) -> Result<ExchangeRate> {
        self.rates.fetch_latest().await
    }
}
