//! Streaming price updates over WebSocket.
//!
//! One background poller fetches quotes for the configured watchlist and
//! publishes them on a broadcast channel; each connected client gets its
//! own receiver. A slow client that lags behind the channel capacity
//! skips ahead instead of stalling the poller or its peers.

use crate::api::AppState;
use crate::infrastructure::yahoo::YahooClient;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of the broadcast ring buffer per subscriber.
pub const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
pub struct PriceUpdate {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub timestamp: DateTime<Utc>,
}

/// Poll quotes for the watchlist forever, broadcasting each reading.
/// Individual quote failures are logged and retried next tick.
pub async fn run_price_poller(
    yahoo: YahooClient,
    watchlist: Vec<String>,
    update_secs: u64,
    tx: broadcast::Sender<PriceUpdate>,
) {
    let mut timer = tokio::time::interval(Duration::from_secs(update_secs.max(1)));
    info!(
        "Price poller started for [{}], every {}s",
        watchlist.join(", "),
        update_secs
    );

    loop {
        timer.tick().await;
        if tx.receiver_count() == 0 {
            continue;
        }
        for ticker in &watchlist {
            match yahoo.quote(ticker).await {
                Ok(quote) => {
                    let update = PriceUpdate {
                        ticker: quote.ticker,
                        price: quote.price,
                        change: quote.change,
                        change_pct: quote.change_pct,
                        timestamp: Utc::now(),
                    };
                    // Only fails when every receiver is gone; harmless.
                    let _ = tx.send(update);
                }
                Err(err) => warn!("Quote poll failed for {ticker}: {err:#}"),
            }
        }
    }
}

pub async fn prices(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.price_tx.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

async fn handle_socket(mut socket: WebSocket, mut rx: broadcast::Receiver<PriceUpdate>) {
    debug!("WebSocket client connected");
    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(update) => {
                    let Ok(payload) = serde_json::to_string(&update) else {
                        continue;
                    };
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client lagged, skipped {skipped} updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                // Inbound payloads are ignored; the stream is one-way.
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("WebSocket client disconnected");
}
