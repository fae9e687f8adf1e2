//! CSV export: materializes the whole store (or a chosen subset) as one
//! wide, date-aligned table and writes it under the configured export
//! directory.

use crate::application::align::align;
use crate::domain::errors::ApiError;
use crate::domain::repositories::SeriesRepository;
use crate::domain::series::AlignedTable;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct ExportService {
    repo: Arc<dyn SeriesRepository>,
    export_dir: PathBuf,
}

impl ExportService {
    pub fn new(repo: Arc<dyn SeriesRepository>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            export_dir: export_dir.into(),
        }
    }

    /// Write every stored series (or only `series_ids`, when given) as a
    /// single date-aligned CSV. Returns the path of the written file.
    ///
    /// Unknown selections and an empty store are caller errors; repository
    /// and filesystem failures keep their server-error classification.
    pub async fn export_csv(&self, series_ids: Option<Vec<String>>) -> Result<PathBuf, ApiError> {
        let catalog = self.repo.list_catalog().await?;
        let selected: Vec<String> = match series_ids {
            Some(ids) if !ids.is_empty() => {
                let known: Vec<&str> = catalog.iter().map(|e| e.series_id.as_str()).collect();
                let missing: Vec<String> = ids
                    .iter()
                    .filter(|id| !known.contains(&id.as_str()))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(ApiError::unknown_series(missing));
                }
                ids
            }
            _ => catalog.into_iter().map(|e| e.series_id).collect(),
        };
        if selected.is_empty() {
            return Err(ApiError::input("nothing to export: the store holds no series"));
        }

        let mut series = Vec::with_capacity(selected.len());
        for id in &selected {
            let meta = self
                .repo
                .find_meta(id)
                .await?
                .ok_or_else(|| ApiError::unknown_series(vec![id.clone()]))?;
            let observations = self.repo.fetch_series(id, None, None).await?;
            series.push((meta, observations));
        }
        let table = align(series);

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.export_dir.display()))?;
        let path = self
            .export_dir
            .join(format!("macro_export_{}.csv", Utc::now().format("%Y%m%d_%H%M%S")));

        // The CSV writer is blocking; keep it off the runtime workers.
        let written_path = path.clone();
        tokio::task::spawn_blocking(move || write_table(&written_path, &table))
            .await
            .map_err(|e| ApiError::internal(format!("export task panicked: {e}")))??;

        info!("Exported {} series to {}", selected.len(), path.display());
        Ok(path)
    }
}

fn write_table(path: &Path, table: &AlignedTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;

    let mut header = vec!["date".to_string()];
    header.extend(table.columns.iter().map(|c| c.meta.series_id.clone()));
    writer.write_record(&header)?;

    for (row, date) in table.dates.iter().enumerate() {
        let mut record = vec![date.to_string()];
        for column in &table.columns {
            record.push(match column.values[row] {
                Some(value) => value.to_string(),
                None => String::new(),
            });
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
