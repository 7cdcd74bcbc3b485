//! Metal History Provider Client
//!
//! Fetches per-day spot price history for one metal through the
//! credential-holding relay path.
//!
//! Features:
//! - Ordered credential list with rotation on 401/403/429: the same request
//!   is retried with the next credential before giving up
//! - Non-auth, non-rate-limit errors propagate immediately (a different
//!   credential would not change the outcome)
//! - Raw-body access for the relay endpoint, which forwards upstream JSON
//!   verbatim
//!
//! Endpoint shape:
//! `GET {base}/history?symbol={GOLD|SILVER}&groupBy=day&startTimestamp={unix}&endTimestamp={unix}`
//! with the credential in the `x-access-token` header. Records look like
//! `{ "day": "YYYY-MM-DD HH:MM:SS", "max_price": "<decimal-as-string>" }`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::HISTORY_AUTH_HEADER;
use crate::error::{AppError, Result};
use crate::models::{MetalSymbol, RawPricePoint};

/// One wire record from the history provider
#[derive(Debug, Deserialize)]
struct HistoryRecord {
    day: String,
    max_price: String,
}

/// Client for the metal history provider with credential rotation
#[derive(Clone)]
pub struct HistoryClient {
    client: reqwest::Client,
    base_url: String,
    api_keys: Vec<String>,
}

impl HistoryClient {
    pub fn new(base_url: String, api_keys: Vec<String>, timeout: Duration) -> Result<Self> {
        if api_keys.is_empty() {
            return Err(AppError::Config(
                "history client needs at least one API key".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_keys,
        })
    }

    fn history_url(&self, symbol: &str, start_ts: i64, end_ts: i64) -> String {
        format!(
            "{}/history?symbol={}&groupBy=day&startTimestamp={}&endTimestamp={}",
            self.base_url, symbol, start_ts, end_ts
        )
    }

    /// Request history and return the upstream body verbatim.
    ///
    /// Credentials are tried in configured order. 401/403/429 rotates to the
    /// next credential; any other failure propagates immediately. After
    /// exhausting all credentials the last observed error is returned with
    /// the attempt count.
    pub async fn request_history_raw(
        &self,
        symbol: &str,
        start_ts: i64,
        end_ts: i64,
    ) -> Result<String> {
        let url = self.history_url(symbol, start_ts, end_ts);
        debug!(symbol, start_ts, end_ts, "Requesting metal history");

        let mut attempts = 0u32;
        let mut last_status: Option<u16> = None;

        for (index, api_key) in self.api_keys.iter().enumerate() {
            attempts += 1;

            let response = self
                .client
                .get(&url)
                .header(HISTORY_AUTH_HEADER, api_key)
                .send()
                .await
                .map_err(|e| AppError::Upstream {
                    message: format!("history request failed: {}", e.without_url()),
                    status: None,
                    attempts,
                })?;

            let status = response.status().as_u16();

            if response.status().is_success() {
                return response.text().await.map_err(|e| AppError::Upstream {
                    message: format!("failed to read history response: {}", e.without_url()),
                    status: Some(status),
                    attempts,
                });
            }

            if status == 401 || status == 403 || status == 429 {
                warn!(
                    status,
                    credential = index + 1,
                    total = self.api_keys.len(),
                    "History credential rejected, rotating"
                );
                last_status = Some(status);
                continue;
            }

            // Not an auth or rate-limit failure: rotation would not help
            return Err(AppError::Upstream {
                message: format!("history provider returned HTTP {}", status),
                status: Some(status),
                attempts,
            });
        }

        match last_status {
            Some(429) => Err(AppError::RateLimit { attempts }),
            status => Err(AppError::Upstream {
                message: format!(
                    "history provider rejected all {} credential(s), last HTTP {}",
                    attempts,
                    status.unwrap_or(0)
                ),
                status,
                attempts,
            }),
        }
    }

    /// Fetch history for one metal as raw price points.
    ///
    /// Records with an unparseable day are skipped; malformed prices are
    /// carried as NaN so the reconciler discards them alongside the
    /// non-positive ones.
    pub async fn fetch_history(
        &self,
        symbol: MetalSymbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawPricePoint>> {
        let body = self
            .request_history_raw(symbol.as_str(), start.timestamp(), end.timestamp())
            .await?;

        let records: Vec<HistoryRecord> = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("history response: {}", e)))?;

        let points: Vec<RawPricePoint> = records
            .into_iter()
            .filter_map(|record| {
                let date = match record
                    .day
                    .get(..10)
                    .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
                {
                    Some(date) => date,
                    None => {
                        warn!(day = %record.day, "Skipping record with unparseable day");
                        return None;
                    }
                };

                let spot_price_usd = record.max_price.trim().parse::<f64>().unwrap_or(f64::NAN);

                Some(RawPricePoint {
                    date,
                    spot_price_usd,
                })
            })
            .collect();

        info!(count = points.len(), %symbol, "Fetched metal history");

        Ok(points)
    }
}
