use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// SQLite connection pool plus schema management.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal); // Better for concurrency

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS data_sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                base_url TEXT NOT NULL DEFAULT ''
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create data_sources table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS data_series (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_id INTEGER NOT NULL REFERENCES data_sources(id),
                series_code TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL DEFAULT '',
                frequency TEXT NOT NULL DEFAULT 'daily',
                unit TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                last_updated INTEGER
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create data_series table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS observations (
                series_id INTEGER NOT NULL REFERENCES data_series(id),
                date TEXT NOT NULL,
                value REAL NOT NULL,
                PRIMARY KEY (series_id, date)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create observations table")?;

        // Index for faster time-range queries on observations
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_observations_date
            ON observations (date);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create observations index")?;

        Ok(())
    }

    /// Row counts for the health endpoint.
    pub async fn table_counts(&self) -> Result<Vec<(String, i64)>> {
        let mut counts = Vec::new();
        for table in ["data_sources", "data_series", "observations"] {
            let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Failed to count rows in {table}"))?;
            counts.push((table.to_string(), row.0));
        }
        Ok(counts)
    }
}
