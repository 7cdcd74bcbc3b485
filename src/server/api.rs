use axum::{
    extract::State,
    http::{header::CACHE_CONTROL, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::models::MetalSymbol;
use crate::server::AppState;
use crate::services::{HealthStats, SourceState};

/// Query parameters for /prices
#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    /// Metals to include (can be repeated: symbol=GOLD&symbol=SILVER);
    /// defaults to all
    pub symbol: Option<Vec<String>>,
}

/// /health response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub stats: HealthStats,
    pub rate: SourceState,
    pub gold: SourceState,
    pub silver: SourceState,
}

fn parse_symbols(raw: Option<Vec<String>>) -> Result<Vec<MetalSymbol>, String> {
    match raw {
        None => Ok(MetalSymbol::ALL.to_vec()),
        Some(values) if values.is_empty() => Ok(MetalSymbol::ALL.to_vec()),
        Some(values) => values.iter().map(|v| v.parse()).collect(),
    }
}

/// GET /prices - Current retail price board
///
/// Examples:
/// - /prices (both metals)
/// - /prices?symbol=GOLD
/// - /prices?symbol=GOLD&symbol=SILVER
#[instrument(skip(app_state))]
pub async fn get_prices_handler(
    State(app_state): State<AppState>,
    Query(params): Query<PricesQuery>,
) -> impl IntoResponse {
    debug!("Received request for prices with params: {:?}", params);

    let requested = match parse_symbols(params.symbol) {
        Ok(symbols) => symbols,
        Err(details) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid symbol", "details": details })),
            )
                .into_response();
        }
    };

    let mut board = app_state.refresher.snapshot().await;
    board.metals.retain(|metal| requested.contains(&metal.symbol));

    info!(
        metals = board.metals.len(),
        has_rate = board.rate.is_some(),
        "Returning price board"
    );

    let mut headers = HeaderMap::new();
    if let Ok(value) = "max-age=60".parse() {
        headers.insert(CACHE_CONTROL, value);
    }

    (StatusCode::OK, headers, Json(board)).into_response()
}

/// POST /refresh - Force a refresh of both metals, bypassing the series TTL
/// (a still-valid exchange rate is reused), then return the updated board.
#[instrument(skip(app_state))]
pub async fn refresh_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    info!("Manual refresh requested");

    app_state.refresher.refresh_all(true).await;
    let board = app_state.refresher.snapshot().await;

    Json(board)
}

/// GET /health - Worker statistics and per-source states
#[instrument(skip(app_state))]
pub async fn health_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let mut stats = app_state.health_stats.read().await.clone();
    stats.uptime_secs = app_state.started_at.elapsed().as_secs();
    stats.current_system_time = chrono::Utc::now().to_rfc3339();

    let board = app_state.refresher.snapshot().await;
    let mut gold = SourceState::default();
    let mut silver = SourceState::default();
    for metal in board.metals {
        let state = SourceState {
            status: metal.status,
            last_error: metal.error,
            last_refreshed_at: metal.last_refreshed_at,
        };
        match metal.symbol {
            MetalSymbol::Gold => gold = state,
            MetalSymbol::Silver => silver = state,
        }
    }

    Json(HealthResponse {
        stats,
        rate: board.rate_status,
        gold,
        silver,
    })
}
