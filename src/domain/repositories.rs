//! Repository abstractions for stored time series.
//!
//! The read side (`SeriesRepository`) is what request handlers and the
//! analysis engine consume; the write side (`SeriesStore`) is only used by
//! the ingestion pipeline. `SqliteSeriesRepository` implements both; the
//! in-memory implementation backs the tests.

use crate::domain::series::{CatalogEntry, Observation, SeriesMeta};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Read access to stored series and their observations.
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    /// Metadata for a series, or `None` if the identifier is not tracked.
    async fn find_meta(&self, series_id: &str) -> Result<Option<SeriesMeta>>;

    /// Ordered observations for a series, optionally restricted to the
    /// inclusive `[start, end]` date range. An unknown series yields an
    /// empty vector; distinguishing unknown from empty is `find_meta`'s job.
    async fn fetch_series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Observation>>;

    /// The most recent observations for a series, newest first.
    async fn latest_n(&self, series_id: &str, n: usize) -> Result<Vec<Observation>>;

    /// Every tracked series with coverage statistics.
    async fn list_catalog(&self) -> Result<Vec<CatalogEntry>>;
}

/// A batch of observations destined for one series.
#[derive(Debug, Clone)]
pub struct SeriesUpsert {
    pub meta: SeriesMeta,
    pub category: String,
    pub observations: Vec<Observation>,
}

/// Write access used by the ingestion pipeline.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Insert-or-update a series definition and its observations.
    /// Re-ingesting an existing (series, date) pair overwrites the value.
    /// Returns the number of observations written.
    async fn upsert_series(&self, source: &str, batch: SeriesUpsert) -> Result<usize>;
}
