use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// OHLC (Open, High, Low, Close) bar with volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcBar {
    /// True when open, high, low and close are all finite.
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Ordered price history for one instrument.
///
/// Timestamps are strictly increasing and every OHLC price is finite. Gaps
/// between bars are allowed.
#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    bars: Vec<OhlcBar>,
}

impl BarSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps and
    /// non-finite prices.
    pub fn new(bars: Vec<OhlcBar>) -> Result<Self> {
        if let Some((pos, bar)) = bars.iter().enumerate().find(|(_, b)| !b.is_finite()) {
            return Err(AppError::InvalidSeries(format!(
                "non-finite price in bar {} at index {}",
                bar.timestamp, pos
            )));
        }

        if let Some(pos) = bars
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(AppError::InvalidSeries(format!(
                "timestamp {} at index {} does not follow {}",
                bars[pos + 1].timestamp,
                pos + 1,
                bars[pos].timestamp
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&OhlcBar> {
        self.bars.last()
    }

    /// Closing prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Latest close, if any bars are present.
    pub fn current_price(&self) -> Option<f64> {
        self.last().map(|b| b.close)
    }

    /// Lowest low and highest high across the series.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let first = self.bars.first()?;
        Some(self.bars.iter().fold((first.low, first.high), |(low, high), b| {
            (low.min(b.low), high.max(b.high))
        }))
    }
}

/// Current price plus the change across the loaded series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceState {
    pub current_price: f64,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
}

impl PriceState {
    /// Change is measured from the first bar's open to the last close.
    pub fn from_series(series: &BarSeries) -> Option<Self> {
        let last = series.last()?;
        let first = &series.bars()[0];

        let (change, percent_change) = if series.len() >= 2 && first.open != 0.0 {
            let change = last.close - first.open;
            (Some(change), Some(change / first.open * 100.0))
        } else {
            (None, None)
        };

        Some(Self {
            current_price: last.close,
            change,
            percent_change,
        })
    }
}
