//! Yahoo Finance chart-API client for quotes and OHLCV history. Thin
//! pass-through: no caching, no retries; failures surface as upstream
//! errors to the caller.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub ticker: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_pct: f64,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<i64>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OhlcvPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<i64>,
    currency: Option<String>,
    exchange_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn quote(&self, ticker: &str) -> Result<Quote> {
        let result = self.chart(ticker, "1d", "1d").await?;
        let meta = result.meta;

        let price = meta
            .regular_market_price
            .with_context(|| format!("no market price in quote payload for {ticker}"))?;
        let previous_close = meta.chart_previous_close.unwrap_or(price);
        let change = price - previous_close;
        let change_pct = if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        Ok(Quote {
            ticker: ticker.to_string(),
            price,
            previous_close,
            change,
            change_pct,
            day_high: meta.regular_market_day_high,
            day_low: meta.regular_market_day_low,
            volume: meta.regular_market_volume,
            currency: meta.currency,
            exchange: meta.exchange_name,
        })
    }

    /// Historical bars; `range` and `interval` use Yahoo's notation
    /// ("1mo", "1y", "1d", "1wk", ...). Bars with incomplete OHLC data
    /// are dropped.
    pub async fn history(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvPoint>> {
        let result = self.chart(ticker, range, interval).await?;
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, ts) in result.timestamp.iter().enumerate() {
            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                continue;
            };
            let (Some(open), Some(high), Some(low), Some(close)) = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
            ) else {
                continue;
            };
            bars.push(OhlcvPoint {
                date,
                open,
                high,
                low,
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }
        Ok(bars)
    }

    async fn chart(&self, ticker: &str, range: &str, interval: &str) -> Result<ChartResult> {
        let url = format!("{}/{}", self.base_url, ticker);
        let response = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await
            .with_context(|| format!("quote request failed for {ticker}"))?;

        if !response.status().is_success() {
            bail!("quote request for {ticker} returned {}", response.status());
        }

        let body: ChartResponse = response
            .json()
            .await
            .with_context(|| format!("chart payload unparsable for {ticker}"))?;

        if let Some(error) = body.chart.error
            && !error.is_null()
        {
            bail!("chart API error for {ticker}: {error}");
        }

        body.chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .with_context(|| format!("chart payload empty for {ticker}"))
    }
}
