use macrodash::api::{self, AppState, ws};
use macrodash::application::indicators::IndicatorService;
use macrodash::application::macro_service::MacroService;
use macrodash::config::Config;
use macrodash::domain::repositories::{SeriesRepository, SeriesStore};
use macrodash::infrastructure::export::ExportService;
use macrodash::infrastructure::fred::FredClient;
use macrodash::infrastructure::ingest::IngestService;
use macrodash::infrastructure::persistence::{Database, SqliteSeriesRepository};
use macrodash::infrastructure::yahoo::YahooClient;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting macrodash server");

    let database = Database::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;

    let sqlite_repo = Arc::new(SqliteSeriesRepository::new(database.pool.clone()));
    let repo: Arc<dyn SeriesRepository> = sqlite_repo.clone();
    let store: Arc<dyn SeriesStore> = sqlite_repo;

    if config.fred_api_key.is_empty() {
        warn!("FRED_API_KEY is not set; ingestion will fail until it is provided");
    }
    let fred = FredClient::new(&config.fred_base_url, &config.fred_api_key);
    let yahoo = YahooClient::new(&config.yahoo_base_url);

    let ingest = Arc::new(IngestService::new(fred, repo.clone(), store));
    tokio::spawn(Arc::clone(&ingest).run_periodic(config.ingest_interval_secs));

    let (price_tx, _) = broadcast::channel(ws::CHANNEL_CAPACITY);
    tokio::spawn(ws::run_price_poller(
        yahoo.clone(),
        config.ws_watchlist.clone(),
        config.ws_update_secs,
        price_tx.clone(),
    ));

    let state = AppState {
        macro_service: Arc::new(MacroService::new(repo.clone())),
        indicators: Arc::new(IndicatorService::new(repo.clone())),
        export: Arc::new(ExportService::new(repo.clone(), &config.export_dir)),
        ingest,
        repo,
        yahoo,
        database: Some(database),
        price_tx,
    };

    let app = api::router(state, &config.cors_origins);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
