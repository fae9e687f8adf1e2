//! FRED (Federal Reserve Economic Data) REST client.
//!
//! Fetches series observations and metadata from the
//! `api.stlouisfed.org/fred` endpoints. FRED encodes a missing value as the
//! literal "."; those slots come back as `Observation::absent` so the
//! ingestion layer can decide what to do with them.

use crate::domain::series::Observation;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";

#[derive(Clone)]
pub struct FredClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: NaiveDate,
    value: String,
}

#[derive(Debug, Deserialize)]
struct SeriesInfoResponse {
    seriess: Vec<RawSeriesInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSeriesInfo {
    pub id: String,
    pub title: String,
    pub frequency: String,
    pub units: String,
}

impl FredClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Ordered observations for a series, optionally bounded by an
    /// inclusive date range.
    pub async fn observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let mut query: Vec<(&str, String)> = vec![
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
        ];
        if let Some(start) = start {
            query.push(("observation_start", start.to_string()));
        }
        if let Some(end) = end {
            query.push(("observation_end", end.to_string()));
        }

        let url = format!("{}/series/observations", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("FRED observations request failed for {series_id}"))?;

        if !response.status().is_success() {
            bail!(
                "FRED observations request for {series_id} returned {}",
                response.status()
            );
        }

        let body: ObservationsResponse = response
            .json()
            .await
            .with_context(|| format!("FRED observations payload unparsable for {series_id}"))?;

        debug!(
            "FRED returned {} observations for {}",
            body.observations.len(),
            series_id
        );

        Ok(body
            .observations
            .into_iter()
            .map(|raw| match raw.value.trim().parse::<f64>() {
                Ok(value) => Observation::new(raw.date, value),
                // "." marks a calendar slot with no reading.
                Err(_) => Observation::absent(raw.date),
            })
            .collect())
    }

    /// Title/frequency/units metadata for a series.
    pub async fn series_info(&self, series_id: &str) -> Result<RawSeriesInfo> {
        let url = format!("{}/series", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
            ])
            .send()
            .await
            .with_context(|| format!("FRED series request failed for {series_id}"))?;

        if !response.status().is_success() {
            bail!(
                "FRED series request for {series_id} returned {}",
                response.status()
            );
        }

        let body: SeriesInfoResponse = response
            .json()
            .await
            .with_context(|| format!("FRED series payload unparsable for {series_id}"))?;

        body.seriess
            .into_iter()
            .next()
            .with_context(|| format!("FRED returned no metadata for {series_id}"))
    }
}
