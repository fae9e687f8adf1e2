//! Orchestration for the macro endpoints: validate the requested IDs,
//! fetch every series from the repository, align, then normalize or
//! correlate as asked.
//!
//! Partial-failure policy: if any requested series cannot be fetched the
//! whole request fails. A silently-missing series would corrupt the
//! correlation output without the caller knowing which series are
//! represented, so there is no degraded mode.

use crate::application::{align, correlation, normalize};
use crate::domain::errors::ApiError;
use crate::domain::repositories::SeriesRepository;
use crate::domain::series::{
    AlignedTable, CorrelationMatrix, LaggedPair, Observation, SeriesMeta,
};
use chrono::NaiveDate;
use futures_util::future::try_join_all;
use std::sync::Arc;

/// Hard ceiling on series per multi-series request.
pub const MAX_MULTI_SERIES: usize = 20;
/// Hard ceiling on series per correlation request.
pub const MAX_CORRELATION_SERIES: usize = 15;
/// Default lag window (periods) when the caller does not supply one.
pub const DEFAULT_MAX_LAG: i32 = 12;

#[derive(Debug, Clone, Default)]
pub struct SeriesQuery {
    pub series_ids: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub struct MacroService {
    repo: Arc<dyn SeriesRepository>,
}

impl MacroService {
    pub fn new(repo: Arc<dyn SeriesRepository>) -> Self {
        Self { repo }
    }

    /// One series with its observations, range-filtered.
    pub async fn single_series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(SeriesMeta, Vec<Observation>), ApiError> {
        let meta = self
            .repo
            .find_meta(series_id)
            .await?
            .ok_or_else(|| ApiError::unknown_series(vec![series_id.to_string()]))?;
        let observations = self.repo.fetch_series(series_id, start, end).await?;
        Ok((meta, observations))
    }

    /// Fetch and align multiple series, optionally z-scoring each column.
    ///
    /// A known series with zero observations in range degrades to an
    /// all-null column; an entirely empty result is an empty table, not an
    /// error.
    pub async fn multi_series(
        &self,
        query: &SeriesQuery,
        normalize_columns: bool,
    ) -> Result<AlignedTable, ApiError> {
        if query.series_ids.is_empty() {
            return Err(ApiError::input("at least one series_id is required"));
        }
        if query.series_ids.len() > MAX_MULTI_SERIES {
            return Err(ApiError::input(format!(
                "max {MAX_MULTI_SERIES} series per request"
            )));
        }

        let mut table = align::align(self.fetch_all(query).await?);

        if normalize_columns {
            table.columns = table.columns.iter().map(normalize::normalize).collect();
        }
        Ok(table)
    }

    /// Contemporaneous matrix plus lagged optimal-lag pairs, sorted by
    /// |correlation| descending with no-signal pairs last.
    pub async fn correlation(
        &self,
        query: &SeriesQuery,
        max_lag: Option<i32>,
    ) -> Result<(CorrelationMatrix, Vec<LaggedPair>), ApiError> {
        if query.series_ids.len() < 2 {
            return Err(ApiError::input(
                "at least 2 series are required for correlation",
            ));
        }
        if query.series_ids.len() > MAX_CORRELATION_SERIES {
            return Err(ApiError::input(format!(
                "max {MAX_CORRELATION_SERIES} series for correlation"
            )));
        }
        let max_lag = max_lag.unwrap_or(DEFAULT_MAX_LAG);
        if max_lag < 0 {
            return Err(ApiError::input("max_lag must be non-negative"));
        }

        let table = align::align(self.fetch_all(query).await?);

        // Cap the search window so short samples are not dominated by
        // large shifts with next to no overlap.
        let effective_lag = max_lag.min((table.dates.len() / 3) as i32);

        let matrix = correlation::correlation_matrix(&table)?;
        let mut lagged = correlation::lag_analysis(&table, effective_lag)?;
        lagged.sort_by(|a, b| {
            let ka = a.correlation.map(f64::abs);
            let kb = b.correlation.map(f64::abs);
            kb.partial_cmp(&ka).unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok((matrix, lagged))
    }

    /// Resolve metadata for every requested ID (rejecting the request with
    /// all unknown IDs named), then fetch observations concurrently.
    async fn fetch_all(
        &self,
        query: &SeriesQuery,
    ) -> Result<Vec<(SeriesMeta, Vec<Observation>)>, ApiError> {
        let metas = try_join_all(
            query
                .series_ids
                .iter()
                .map(|id| self.repo.find_meta(id)),
        )
        .await?;

        let unknown: Vec<String> = query
            .series_ids
            .iter()
            .zip(&metas)
            .filter(|(_, meta)| meta.is_none())
            .map(|(id, _)| id.clone())
            .collect();
        if !unknown.is_empty() {
            return Err(ApiError::unknown_series(unknown));
        }

        let fetches = try_join_all(
            query
                .series_ids
                .iter()
                .map(|id| self.repo.fetch_series(id, query.start, query.end)),
        )
        .await?;

        Ok(metas.into_iter().flatten().zip(fetches).collect())
    }
}
