/// History relay endpoint
///
/// Same-origin pass-through to the metal history provider for dashboard
/// deployments that cannot hold credentials client-side. The secret header
/// is injected here, with the same credential rotation the gateway uses.
/// Upstream JSON is returned verbatim on success; failures become a
/// structured `{error, details}` body with the upstream (or 500) status.
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::error::AppError;
use crate::models::MetalSymbol;
use crate::server::AppState;

/// Query parameters for /relay/history, mirroring the upstream contract
#[derive(Debug, Deserialize)]
pub struct RelayQuery {
    pub symbol: String,
    #[serde(rename = "startTimestamp")]
    pub start_timestamp: i64,
    #[serde(rename = "endTimestamp")]
    pub end_timestamp: i64,
}

/// GET /relay/history?symbol=GOLD&startTimestamp=...&endTimestamp=...
#[instrument(skip(app_state))]
pub async fn history_relay_handler(
    State(app_state): State<AppState>,
    axum::extract::Query(params): axum::extract::Query<RelayQuery>,
) -> impl IntoResponse {
    debug!(symbol = %params.symbol, "Relaying history request");

    let symbol: MetalSymbol = match params.symbol.parse() {
        Ok(symbol) => symbol,
        Err(details) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid symbol", "details": details })),
            )
                .into_response();
        }
    };

    match app_state
        .history
        .request_history_raw(symbol.as_str(), params.start_timestamp, params.end_timestamp)
        .await
    {
        Ok(body) => {
            info!(%symbol, content_size = body.len(), "Relayed history response");
            (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            warn!(%symbol, error = %e, "Relay request failed");
            relay_error_response(&e).into_response()
        }
    }
}

/// Map a gateway error onto the relay's failure contract
fn relay_error_response(error: &AppError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match error {
        AppError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
        AppError::Upstream {
            status: Some(code), ..
        } => StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(json!({
            "error": "upstream request failed",
            "details": error.to_string(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_maps_to_429() {
        let (status, _) = relay_error_response(&AppError::RateLimit { attempts: 3 });
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn upstream_status_is_passed_through() {
        let (status, _) = relay_error_response(&AppError::Upstream {
            message: "HTTP 401".to_string(),
            status: Some(401),
            attempts: 2,
        });
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_upstream_status_becomes_500() {
        let (status, _) = relay_error_response(&AppError::Upstream {
            message: "connect timeout".to_string(),
            status: None,
            attempts: 1,
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
