//! Seed-driven FRED ingestion: ensures every configured series exists in
//! the store, fetches new observations, and upserts them. Runs once at
//! startup, then periodically on a background task; also triggerable
//! through the data API.

use crate::domain::repositories::{SeriesRepository, SeriesStore, SeriesUpsert};
use crate::domain::series::SeriesMeta;
use crate::infrastructure::fred::FredClient;
use anyhow::{Context, Result};
use chrono::Days;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const SOURCE_NAME: &str = "FRED";

/// Series definition: (id, display name, unit, frequency, category).
type SeedDef = (&'static str, &'static str, &'static str, &'static str, &'static str);

/// The tracked FRED catalog. Mirrors the dashboard's indicator set: the
/// Treasury curve, the key-indicator strip, and the recession checks.
const SEED_SERIES: [SeedDef; 20] = [
    ("DGS3MO", "3-Month Treasury", "%", "daily", "rates"),
    ("DGS1", "1-Year Treasury", "%", "daily", "rates"),
    ("DGS2", "2-Year Treasury", "%", "daily", "rates"),
    ("DGS5", "5-Year Treasury", "%", "daily", "rates"),
    ("DGS10", "10-Year Treasury", "%", "daily", "rates"),
    ("DGS30", "30-Year Treasury", "%", "daily", "rates"),
    ("T10Y2Y", "10Y-2Y Spread", "%", "daily", "rates"),
    ("T10Y3M", "10Y-3M Spread", "%", "daily", "rates"),
    ("FEDFUNDS", "Fed Funds Rate", "%", "monthly", "rates"),
    ("CPIAUCSL", "CPI (All Urban)", "Index", "monthly", "inflation"),
    ("UNRATE", "Unemployment Rate", "%", "monthly", "labor"),
    ("MANEMP", "Mfg Employment", "Thousands", "monthly", "labor"),
    ("SAHMREALTIME", "Sahm Rule Indicator", "pp", "monthly", "labor"),
    ("GDP", "Real GDP", "Billions $", "quarterly", "activity"),
    ("CFNAI", "Chicago Fed Activity", "Index", "monthly", "activity"),
    ("USSLIND", "Leading Index (US)", "%", "monthly", "activity"),
    ("RECPROUSM156N", "Recession Probability", "%", "monthly", "activity"),
    ("BAMLH0A0HYM2", "HY OAS", "bps", "daily", "credit"),
    ("NFCI", "Financial Conditions", "Index", "weekly", "credit"),
    ("STLFSI4", "Financial Stress (StL Fed)", "Index", "weekly", "credit"),
];

pub struct IngestService {
    fred: FredClient,
    repo: Arc<dyn SeriesRepository>,
    store: Arc<dyn SeriesStore>,
}

impl IngestService {
    pub fn new(
        fred: FredClient,
        repo: Arc<dyn SeriesRepository>,
        store: Arc<dyn SeriesStore>,
    ) -> Self {
        Self { fred, repo, store }
    }

    /// Sync every seeded series. Incremental: only observations newer than
    /// the stored last date are requested, unless `full_sync` is set.
    ///
    /// A single failing series is logged and skipped so one flaky upstream
    /// series cannot starve the rest of the catalog; the error count is
    /// reported back to the caller.
    pub async fn sync_all(&self, full_sync: bool) -> Result<SyncReport> {
        let last_dates: HashMap<String, _> = self
            .repo
            .list_catalog()
            .await
            .context("Failed to read catalog before sync")?
            .into_iter()
            .filter_map(|e| e.last_date.map(|d| (e.series_id, d)))
            .collect();

        let mut report = SyncReport::default();

        for (id, name, unit, frequency, category) in SEED_SERIES {
            let start = if full_sync {
                None
            } else {
                last_dates
                    .get(id)
                    .and_then(|last| last.checked_add_days(Days::new(1)))
            };

            info!(
                "Fetching FRED series {} (from {})",
                id,
                start.map_or("full history".to_string(), |d| d.to_string())
            );

            let observations = match self.fred.observations(id, start, None).await {
                Ok(obs) => obs,
                Err(err) => {
                    error!("Failed to fetch FRED series {}: {:#}", id, err);
                    report.failed += 1;
                    continue;
                }
            };
            if observations.is_empty() {
                continue;
            }

            let batch = SeriesUpsert {
                meta: SeriesMeta {
                    series_id: id.to_string(),
                    display_name: name.to_string(),
                    unit: unit.to_string(),
                    frequency: frequency.to_string(),
                },
                category: category.to_string(),
                observations,
            };

            match self.store.upsert_series(SOURCE_NAME, batch).await {
                Ok(written) => {
                    report.series_synced += 1;
                    report.observations_written += written;
                }
                Err(err) => {
                    error!("Failed to upsert FRED series {}: {:#}", id, err);
                    report.failed += 1;
                }
            }
        }

        info!(
            "FRED sync complete: {} series, {} observations, {} failures",
            report.series_synced, report.observations_written, report.failed
        );
        Ok(report)
    }

    /// Background loop: initial sync immediately, then one incremental
    /// sync per interval.
    pub async fn run_periodic(self: Arc<Self>, interval_secs: u64) {
        let mut timer = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            timer.tick().await;
            if let Err(err) = self.sync_all(false).await {
                warn!("Scheduled FRED sync failed: {:#}", err);
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
pub struct SyncReport {
    pub series_synced: usize,
    pub observations_written: usize,
    pub failed: usize,
}
