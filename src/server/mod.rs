pub mod api;
pub mod relay;

use axum::http::Method;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::services::metal_history::HistoryClient;
use crate::services::{SharedHealthStats, SharedRefresher};
use crate::utils::get_public_dir;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub refresher: SharedRefresher,
    pub history: Arc<HistoryClient>,
    pub health_stats: SharedHealthStats,
    pub started_at: Instant,
}

/// Start the axum server
pub async fn serve(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting sunchandi server");

    // Public dashboard deployments hit this from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let public_dir = get_public_dir();
    tracing::info!("Using public directory: {}", public_dir.display());

    tracing::info!("Registering routes:");
    tracing::info!("  GET  /prices?symbol=GOLD&symbol=SILVER");
    tracing::info!("  POST /refresh");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /relay/history?symbol=GOLD&startTimestamp=...&endTimestamp=...");
    tracing::info!("  GET  /public/* (static files from {})", public_dir.display());

    let app = Router::new()
        .route("/prices", get(api::get_prices_handler))
        .route("/refresh", post(api::refresh_handler))
        .route("/health", get(api::health_handler))
        .route("/relay/history", get(relay::history_relay_handler))
        .nest_service("/public", ServeDir::new(public_dir))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
