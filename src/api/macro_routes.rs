//! Handlers for the macro data endpoints: series reads, the aligned
//! multi-series table, the correlation engine, and the dashboard read
//! models.

use crate::api::error::ErrorResponse;
use crate::api::schemas::{
    CorrelationRequest, CorrelationResponse, MultiSeriesRequest, MultiSeriesResponse, RangeQuery,
    SeriesResponse,
};
use crate::api::AppState;
use crate::application::indicators::{RecessionRisk, YieldCurveSnapshot};
use crate::application::macro_service::SeriesQuery;
use crate::domain::series::CatalogEntry;
use axum::Json;
use axum::extract::{Path, Query, State};

pub async fn single_series(
    State(state): State<AppState>,
    Path(series_id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<SeriesResponse>, ErrorResponse> {
    let (meta, observations) = state
        .macro_service
        .single_series(&series_id, range.start, range.end)
        .await?;
    Ok(Json(SeriesResponse::from_parts(meta, observations)))
}

pub async fn catalog(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogEntry>>, ErrorResponse> {
    let entries = state
        .repo
        .list_catalog()
        .await
        .map_err(crate::domain::errors::ApiError::from)?;
    Ok(Json(entries))
}

pub async fn yield_curve(
    State(state): State<AppState>,
) -> Result<Json<YieldCurveSnapshot>, ErrorResponse> {
    Ok(Json(state.indicators.yield_curve().await?))
}

pub async fn indicators(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::application::indicators::IndicatorSummary>>, ErrorResponse> {
    Ok(Json(state.indicators.indicators().await?))
}

pub async fn multi_series(
    State(state): State<AppState>,
    Json(request): Json<MultiSeriesRequest>,
) -> Result<Json<MultiSeriesResponse>, ErrorResponse> {
    let query = SeriesQuery {
        series_ids: request.series_ids,
        start: request.start,
        end: request.end,
    };
    let table = state
        .macro_service
        .multi_series(&query, request.normalize)
        .await?;
    Ok(Json(table.into()))
}

pub async fn correlation(
    State(state): State<AppState>,
    Json(request): Json<CorrelationRequest>,
) -> Result<Json<CorrelationResponse>, ErrorResponse> {
    let query = SeriesQuery {
        series_ids: request.series_ids,
        start: request.start,
        end: request.end,
    };
    let (matrix, lagged) = state
        .macro_service
        .correlation(&query, request.max_lag)
        .await?;
    Ok(Json(CorrelationResponse::from_parts(matrix, lagged)))
}

pub async fn recession_risk(
    State(state): State<AppState>,
) -> Result<Json<RecessionRisk>, ErrorResponse> {
    Ok(Json(state.indicators.recession_risk().await?))
}
