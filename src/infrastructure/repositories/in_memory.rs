//! Thread-safe in-memory implementation of the series repository traits.
//! Backs the tests and makes the service runnable without a database file.

use crate::domain::repositories::{SeriesRepository, SeriesStore, SeriesUpsert};
use crate::domain::series::{CatalogEntry, Observation, SeriesMeta};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct StoredSeries {
    meta: SeriesMeta,
    category: String,
    observations: BTreeMap<NaiveDate, f64>,
}

pub struct InMemorySeriesRepository {
    // BTreeMap keyed by series_code keeps catalog order deterministic.
    series: Arc<RwLock<BTreeMap<String, StoredSeries>>>,
}

impl InMemorySeriesRepository {
    pub fn new() -> Self {
        Self {
            series: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Test convenience: insert a series with dated values in one call.
    pub async fn seed(&self, meta: SeriesMeta, points: &[(NaiveDate, f64)]) {
        let mut guard = self.series.write().await;
        guard.insert(
            meta.series_id.clone(),
            StoredSeries {
                meta,
                category: String::new(),
                observations: points.iter().copied().collect(),
            },
        );
    }
}

impl Default for InMemorySeriesRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeriesRepository for InMemorySeriesRepository {
    async fn find_meta(&self, series_id: &str) -> Result<Option<SeriesMeta>> {
        let guard = self.series.read().await;
        Ok(guard.get(series_id).map(|s| s.meta.clone()))
    }

    async fn fetch_series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let guard = self.series.read().await;
        let Some(stored) = guard.get(series_id) else {
            return Ok(Vec::new());
        };
        Ok(stored
            .observations
            .iter()
            .filter(|(date, _)| start.is_none_or(|s| **date >= s))
            .filter(|(date, _)| end.is_none_or(|e| **date <= e))
            .map(|(date, value)| Observation::new(*date, *value))
            .collect())
    }

    async fn latest_n(&self, series_id: &str, n: usize) -> Result<Vec<Observation>> {
        let guard = self.series.read().await;
        let Some(stored) = guard.get(series_id) else {
            return Ok(Vec::new());
        };
        Ok(stored
            .observations
            .iter()
            .rev()
            .take(n)
            .map(|(date, value)| Observation::new(*date, *value))
            .collect())
    }

    async fn list_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let guard = self.series.read().await;
        Ok(guard
            .values()
            .map(|s| CatalogEntry {
                series_id: s.meta.series_id.clone(),
                display_name: s.meta.display_name.clone(),
                unit: s.meta.unit.clone(),
                frequency: s.meta.frequency.clone(),
                category: s.category.clone(),
                observation_count: s.observations.len() as i64,
                first_date: s.observations.keys().next().copied(),
                last_date: s.observations.keys().next_back().copied(),
            })
            .collect())
    }
}

#[async_trait]
impl SeriesStore for InMemorySeriesRepository {
    async fn upsert_series(&self, _source: &str, batch: SeriesUpsert) -> Result<usize> {
        let mut guard = self.series.write().await;
        let entry = guard
            .entry(batch.meta.series_id.clone())
            .or_insert_with(|| StoredSeries {
                meta: batch.meta.clone(),
                category: batch.category.clone(),
                observations: BTreeMap::new(),
            });
        entry.meta = batch.meta;
        entry.category = batch.category;

        let mut written = 0;
        for obs in batch.observations {
            if let Some(value) = obs.value {
                entry.observations.insert(obs.date, value);
                written += 1;
            }
        }
        Ok(written)
    }
}
