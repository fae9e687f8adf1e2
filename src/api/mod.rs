//! HTTP surface: route registration, shared state, and the health probes.

pub mod data;
pub mod error;
pub mod macro_routes;
pub mod market;
pub mod options;
pub mod schemas;
pub mod ws;

use crate::application::indicators::IndicatorService;
use crate::application::macro_service::MacroService;
use crate::domain::repositories::SeriesRepository;
use crate::infrastructure::export::ExportService;
use crate::infrastructure::ingest::IngestService;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::yahoo::YahooClient;
use axum::extract::State;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn SeriesRepository>,
    pub macro_service: Arc<MacroService>,
    pub indicators: Arc<IndicatorService>,
    pub export: Arc<ExportService>,
    pub ingest: Arc<IngestService>,
    pub yahoo: YahooClient,
    /// Present when backed by SQLite; the in-memory repository has no pool
    /// to probe, so `/health/db` reports accordingly.
    pub database: Option<Database>,
    pub price_tx: broadcast::Sender<ws::PriceUpdate>,
}

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let cors = cors_layer(cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/health/db", get(health_db))
        .route("/api/macro/series/{series_id}", get(macro_routes::single_series))
        .route("/api/macro/catalog", get(macro_routes::catalog))
        .route("/api/macro/yield-curve", get(macro_routes::yield_curve))
        .route("/api/macro/indicators", get(macro_routes::indicators))
        .route("/api/macro/multi-series", post(macro_routes::multi_series))
        .route("/api/macro/correlation", post(macro_routes::correlation))
        .route("/api/macro/recession-risk", get(macro_routes::recession_risk))
        .route("/api/market/quote/{ticker}", get(market::quote))
        .route("/api/market/history/{ticker}", get(market::history))
        .route("/api/data/series", get(data::list_series))
        .route("/api/data/export", post(data::export))
        .route("/api/data/pipeline/trigger", post(data::trigger_pipeline))
        .route("/api/options/black-scholes", post(options::black_scholes_price))
        .route("/api/options/binomial", post(options::binomial))
        .route("/api/options/monte-carlo", post(options::monte_carlo_price))
        .route("/api/options/implied-vol", post(options::implied_vol))
        .route("/api/options/greeks-surface", post(options::greeks_surface))
        .route("/ws/prices", get(ws::prices))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring unparsable CORS origin: {o}");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn health_db(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, error::ErrorResponse> {
    let Some(database) = &state.database else {
        return Ok(Json(json!({ "status": "ok", "backend": "memory" })));
    };
    let counts = database
        .table_counts()
        .await
        .map_err(crate::domain::errors::ApiError::from)?;
    let tables: serde_json::Map<String, serde_json::Value> = counts
        .into_iter()
        .map(|(table, count)| (table, json!(count)))
        .collect();
    Ok(Json(json!({ "status": "ok", "backend": "sqlite", "tables": tables })))
}
