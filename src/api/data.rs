//! Data-management endpoints: catalog listing, CSV export, and manual
//! pipeline triggering.

use crate::api::error::ErrorResponse;
use crate::api::schemas::{ExportRequest, ExportResponse, PipelineTriggerRequest};
use crate::api::AppState;
use crate::domain::errors::ApiError;
use crate::domain::series::CatalogEntry;
use crate::infrastructure::ingest::SyncReport;
use axum::Json;
use axum::extract::State;
use tracing::info;

pub async fn list_series(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogEntry>>, ErrorResponse> {
    let entries = state.repo.list_catalog().await.map_err(ApiError::from)?;
    Ok(Json(entries))
}

pub async fn export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, ErrorResponse> {
    let path = state.export.export_csv(request.series_ids).await?;
    Ok(Json(ExportResponse {
        path: path.display().to_string(),
    }))
}

pub async fn trigger_pipeline(
    State(state): State<AppState>,
    Json(request): Json<PipelineTriggerRequest>,
) -> Result<Json<SyncReport>, ErrorResponse> {
    info!("Pipeline sync requested (full_sync={})", request.full_sync);
    let report = state
        .ingest
        .sync_all(request.full_sync)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(report))
}
