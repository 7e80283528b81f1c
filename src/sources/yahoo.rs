//! Yahoo Finance chart client for intraday bars.
//!
//! Uses the unofficial v8 chart endpoint, which needs no API key.

use crate::error::{AppError, Result};
use crate::types::{BarSeries, OhlcBar};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance chart client.
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self { client })
    }

    /// Fetch bars for a symbol.
    ///
    /// - range: "1d", "5d", "1mo", ...
    /// - interval: "1m", "5m", "15m", "1h", "1d", ...
    pub async fn fetch_bars(&self, symbol: &str, range: &str, interval: &str) -> Result<BarSeries> {
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
            symbol, range, interval
        );
        debug!("Fetching Yahoo Finance bars: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::UpstreamFetch(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamFetch(format!("HTTP {}", response.status())));
        }

        let data: ChartResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamFetch(format!("parse error: {}", e)))?;

        let bars = parse_chart(data)?;
        if bars.is_empty() {
            return Err(AppError::UpstreamFetch(format!("no bars for {}", symbol)));
        }
        debug!("Fetched {} bars for {}", bars.len(), symbol);

        BarSeries::new(bars)
    }
}

/// Turn a chart response into ascending bars with unique timestamps.
///
/// Rows without a close are dropped. Missing open/high/low fall back to the
/// close. A repeated timestamp keeps the later row.
fn parse_chart(data: ChartResponse) -> Result<Vec<OhlcBar>> {
    if let Some(error) = data.chart.error {
        return Err(AppError::UpstreamFetch(format!(
            "Yahoo API error: {} - {}",
            error.code, error.description
        )));
    }

    let result = data
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| AppError::UpstreamFetch("empty chart result".to_string()))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    // Keyed by timestamp: ascending order, and a later row replaces an earlier one.
    let mut bars: BTreeMap<i64, OhlcBar> = BTreeMap::new();
    let mut skipped = 0;
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let close = match at(&quote.close, i).filter(|c| c.is_finite() && *c > 0.0) {
            Some(close) => close,
            None => {
                skipped += 1;
                continue;
            }
        };

        let bar = OhlcBar {
            timestamp: timestamp * 1000,
            open: at(&quote.open, i).unwrap_or(close),
            high: at(&quote.high, i).unwrap_or(close),
            low: at(&quote.low, i).unwrap_or(close),
            close,
            volume: at(&quote.volume, i).unwrap_or(0.0),
        };

        bars.insert(bar.timestamp, bar);
    }

    if skipped > 0 {
        warn!("Dropped {} bars without a close", skipped);
    }

    Ok(bars.into_values().collect())
}
