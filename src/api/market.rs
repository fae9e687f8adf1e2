//! Live-market pass-through endpoints backed by the Yahoo chart API.
//! Upstream failures map to 502, never 500: the service itself is healthy.

use crate::api::error::ErrorResponse;
use crate::api::schemas::{HistoryInterval, HistoryQuery, HistoryRange};
use crate::api::AppState;
use crate::domain::errors::ApiError;
use crate::infrastructure::yahoo::{OhlcvPoint, Quote};
use axum::Json;
use axum::extract::{Path, Query, State};

pub async fn quote(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Quote>, ErrorResponse> {
    let quote = state
        .yahoo
        .quote(&ticker)
        .await
        .map_err(|e| ApiError::upstream(format!("{e:#}")))?;
    Ok(Json(quote))
}

pub async fn history(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<OhlcvPoint>>, ErrorResponse> {
    let range = query.range.unwrap_or(HistoryRange::OneYear);
    let interval = query.interval.unwrap_or(HistoryInterval::Daily);
    let bars = state
        .yahoo
        .history(&ticker, range.as_str(), interval.as_str())
        .await
        .map_err(|e| ApiError::upstream(format!("{e:#}")))?;
    Ok(Json(bars))
}
