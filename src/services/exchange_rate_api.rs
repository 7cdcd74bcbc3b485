//! Exchange-Rate Provider Client
//!
//! Fetches the latest USD base rates and extracts the NPR conversion rate.
//! The provider's `time_next_update_unix` is authoritative for how long the
//! rate may be reused; the cache never invents its own expiry.
//!
//! Endpoint shape: `GET {base}/{api_key}/latest/USD`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::ExchangeRate;

/// Exchange-rate provider response (success and error envelopes share it)
#[derive(Debug, Deserialize)]
struct RateResponse {
    result: String,
    #[serde(default)]
    time_next_update_unix: i64,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

/// Client for the exchange-rate provider
#[derive(Clone)]
pub struct RateClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RateClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Fetch the current USD -> NPR rate with its provider-declared expiry.
    pub async fn fetch_latest(&self) -> Result<ExchangeRate> {
        // The key is a path segment, so request errors are logged without
        // their URL.
        let url = format!("{}/{}/latest/USD", self.base_url, self.api_key);
        debug!("Fetching USD/NPR exchange rate");

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::Upstream {
                message: format!("exchange-rate request failed: {}", e.without_url()),
                status: None,
                attempts: 1,
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            if status == 429 {
                return Err(AppError::RateLimit { attempts: 1 });
            }
            return Err(AppError::Upstream {
                message: format!("exchange-rate provider returned HTTP {}", status),
                status: Some(status),
                attempts: 1,
            });
        }

        let body = response.text().await.map_err(|e| AppError::Upstream {
            message: format!("failed to read exchange-rate response: {}", e.without_url()),
            status: Some(status),
            attempts: 1,
        })?;

        let parsed: RateResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("exchange-rate response: {}", e)))?;

        if parsed.result != "success" {
            return Err(AppError::Parse(format!(
                "exchange-rate provider result was '{}'",
                parsed.result
            )));
        }

        let rate_npr_per_usd = *parsed
            .conversion_rates
            .get("NPR")
            .ok_or_else(|| AppError::Parse("conversion_rates.NPR missing".to_string()))?;

        if !rate_npr_per_usd.is_finite() || rate_npr_per_usd <= 0.0 {
            return Err(AppError::Parse(format!(
                "conversion_rates.NPR is not a positive number: {}",
                rate_npr_per_usd
            )));
        }

        let valid_until = DateTime::from_timestamp(parsed.time_next_update_unix, 0)
            .ok_or_else(|| {
                AppError::Parse(format!(
                    "time_next_update_unix is not a valid timestamp: {}",
                    parsed.time_next_update_unix
                ))
            })?;

        let rate = ExchangeRate {
            rate_npr_per_usd,
            valid_until,
            fetched_at: Utc::now(),
        };

        info!(
            rate = rate.rate_npr_per_usd,
            valid_until = %rate.valid_until,
            "Fetched exchange rate"
        );

        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    async fn spawn_fixture(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> RateClient {
        RateClient::new(base_url, "test-key".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn parses_successful_response() {
        let app = Router::new().route(
            "/test-key/latest/USD",
            get(|| async {
                r#"{
                    "result": "success",
                    "time_next_update_unix": 4102444800,
                    "conversion_rates": { "NPR": 144.5737, "INR": 87.52 }
                }"#
            }),
        );
        let base_url = spawn_fixture(app).await;

        let rate = client_for(base_url).fetch_latest().await.unwrap();

        assert_eq!(rate.rate_npr_per_usd, 144.5737);
        assert_eq!(rate.valid_until.timestamp(), 4102444800);
        assert!(rate.is_valid(Utc::now()));
    }

    #[tokio::test]
    async fn missing_npr_is_a_parse_error() {
        let app = Router::new().route(
            "/test-key/latest/USD",
            get(|| async {
                r#"{
                    "result": "success",
                    "time_next_update_unix": 4102444800,
                    "conversion_rates": { "INR": 87.52 }
                }"#
            }),
        );
        let base_url = spawn_fixture(app).await;

        let result = client_for(base_url).fetch_latest().await;

        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn provider_error_result_is_a_parse_error() {
        let app = Router::new().route(
            "/test-key/latest/USD",
            get(|| async { r#"{ "result": "error", "error-type": "invalid-key" }"# }),
        );
        let base_url = spawn_fixture(app).await;

        let result = client_for(base_url).fetch_latest().await;

        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn http_error_maps_to_upstream_failure() {
        let app = Router::new().route(
            "/test-key/latest/USD",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = spawn_fixture(app).await;

        let result = client_for(base_url).fetch_latest().await;

        match result {
            Err(AppError::Upstream {
                status, attempts, ..
            }) => {
                assert_eq!(status, Some(500));
                assert_eq!(attempts, 1);
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }
}
