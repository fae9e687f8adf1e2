//! Configuration loading from environment variables.
//!
//! Every knob has a sensible default so the service boots with nothing but
//! a FRED API key in the environment (and even without one, FRED ingestion
//! simply fails and is retried while the rest of the API keeps serving).

use crate::infrastructure::{fred, yahoo};
use anyhow::{Context, Result};
use std::env;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,

    pub fred_api_key: String,
    pub fred_base_url: String,
    pub yahoo_base_url: String,

    pub ingest_interval_secs: u64,
    pub export_dir: String,

    pub ws_watchlist: Vec<String>,
    pub ws_update_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/macrodash.db".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            cors_origins: parse_list(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            fred_api_key: env::var("FRED_API_KEY").unwrap_or_default(),
            fred_base_url: env::var("FRED_BASE_URL")
                .unwrap_or_else(|_| fred::DEFAULT_BASE_URL.to_string()),
            yahoo_base_url: env::var("YAHOO_BASE_URL")
                .unwrap_or_else(|_| yahoo::DEFAULT_BASE_URL.to_string()),
            ingest_interval_secs: parse_env("INGEST_INTERVAL_SECS", 6 * 60 * 60)?,
            export_dir: env::var("EXPORT_DIR").unwrap_or_else(|_| "data/exports".to_string()),
            ws_watchlist: parse_list(
                &env::var("WS_WATCHLIST").unwrap_or_else(|_| "SPY,GLD,^TNX".to_string()),
            ),
            ws_update_secs: parse_env("WS_UPDATE_SECS", 5)?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("Invalid {key}: {raw}")),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::from_env().expect("Should parse with defaults");
        assert!(config.database_url.starts_with("sqlite://"));
        assert_eq!(config.ws_update_secs, 5);
        assert_eq!(config.ws_watchlist, vec!["SPY", "GLD", "^TNX"]);
    }

    #[test]
    fn list_parsing_trims_and_drops_empties() {
        assert_eq!(parse_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }
}
