use crate::domain::repositories::{SeriesRepository, SeriesStore, SeriesUpsert};
use crate::domain::series::{CatalogEntry, Observation, SeriesMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use tracing::debug;

pub struct SqliteSeriesRepository {
    pool: SqlitePool,
}

impl SqliteSeriesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeriesRepository for SqliteSeriesRepository {
    async fn find_meta(&self, series_id: &str) -> Result<Option<SeriesMeta>> {
        let row = sqlx::query(
            "SELECT series_code, display_name, unit, frequency FROM data_series WHERE series_code = ?",
        )
        .bind(series_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load series metadata")?;

        row.map(|row| {
            Ok(SeriesMeta {
                series_id: row.try_get("series_code")?,
                display_name: row.try_get("display_name")?,
                unit: row.try_get("unit")?,
                frequency: row.try_get("frequency")?,
            })
        })
        .transpose()
    }

    async fn fetch_series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let rows = sqlx::query(
            r#"
            SELECT o.date, o.value
            FROM observations o
            JOIN data_series s ON s.id = o.series_id
            WHERE s.series_code = ?
              AND (? IS NULL OR o.date >= ?)
              AND (? IS NULL OR o.date <= ?)
            ORDER BY o.date
            "#,
        )
        .bind(series_id)
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch observations for {series_id}"))?;

        rows.into_iter()
            .map(|row| {
                Ok(Observation {
                    date: row.try_get("date")?,
                    value: Some(row.try_get("value")?),
                })
            })
            .collect()
    }

    async fn latest_n(&self, series_id: &str, n: usize) -> Result<Vec<Observation>> {
        let rows = sqlx::query(
            r#"
            SELECT o.date, o.value
            FROM observations o
            JOIN data_series s ON s.id = o.series_id
            WHERE s.series_code = ?
            ORDER BY o.date DESC
            LIMIT ?
            "#,
        )
        .bind(series_id)
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to fetch latest observations for {series_id}"))?;

        rows.into_iter()
            .map(|row| {
                Ok(Observation {
                    date: row.try_get("date")?,
                    value: Some(row.try_get("value")?),
                })
            })
            .collect()
    }

    async fn list_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT s.series_code, s.display_name, s.unit, s.frequency, s.category,
                   COUNT(o.date) AS observation_count,
                   MIN(o.date) AS first_date,
                   MAX(o.date) AS last_date
            FROM data_series s
            LEFT JOIN observations o ON o.series_id = s.id
            GROUP BY s.id
            ORDER BY s.series_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list catalog")?;

        rows.into_iter()
            .map(|row| {
                Ok(CatalogEntry {
                    series_id: row.try_get("series_code")?,
                    display_name: row.try_get("display_name")?,
                    unit: row.try_get("unit")?,
                    frequency: row.try_get("frequency")?,
                    category: row.try_get("category")?,
                    observation_count: row.try_get("observation_count")?,
                    first_date: row.try_get("first_date")?,
                    last_date: row.try_get("last_date")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl SeriesStore for SqliteSeriesRepository {
    async fn upsert_series(&self, source: &str, batch: SeriesUpsert) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO data_sources (name) VALUES (?)")
            .bind(source)
            .execute(&mut *tx)
            .await
            .context("Failed to ensure data source")?;
        let source_id: i64 = sqlx::query("SELECT id FROM data_sources WHERE name = ?")
            .bind(source)
            .fetch_one(&mut *tx)
            .await?
            .try_get("id")?;

        sqlx::query(
            r#"
            INSERT INTO data_series (source_id, series_code, display_name, frequency, unit, category, last_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(series_code) DO UPDATE SET
                display_name = excluded.display_name,
                frequency = excluded.frequency,
                unit = excluded.unit,
                category = excluded.category,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(source_id)
        .bind(&batch.meta.series_id)
        .bind(&batch.meta.display_name)
        .bind(&batch.meta.frequency)
        .bind(&batch.meta.unit)
        .bind(&batch.category)
        .bind(chrono::Utc::now().timestamp())
        .execute(&mut *tx)
        .await
        .context("Failed to upsert series definition")?;

        let series_row_id: i64 = sqlx::query("SELECT id FROM data_series WHERE series_code = ?")
            .bind(&batch.meta.series_id)
            .fetch_one(&mut *tx)
            .await?
            .try_get("id")?;

        let mut written = 0usize;
        for obs in &batch.observations {
            // Providers report absent slots (FRED "."); those are not rows.
            let Some(value) = obs.value else { continue };
            sqlx::query(
                r#"
                INSERT INTO observations (series_id, date, value)
                VALUES (?, ?, ?)
                ON CONFLICT(series_id, date) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(series_row_id)
            .bind(obs.date)
            .bind(value)
            .execute(&mut *tx)
            .await
            .context("Failed to upsert observation")?;
            written += 1;
        }

        tx.commit().await?;
        debug!(
            "Upserted {} observations for {}/{}",
            written, source, batch.meta.series_id
        );
        Ok(written)
    }
}
