//! Simple Moving Average (SMA) indicator.

use crate::error::Result;
use crate::services::signals::{ensure_periods, Indicator, Series};
use crate::types::OhlcBar;
use std::collections::BTreeMap;

/// Rolling arithmetic mean over `period` values.
///
/// The first `period - 1` entries are `None`.
pub fn rolling_mean(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

/// SMA (Simple Moving Average) of closing prices.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = Series;

    fn id(&self) -> &'static str {
        "sma"
    }

    fn min_periods(&self) -> usize {
        self.period.max(1)
    }

    fn calculate(&self, bars: &[OhlcBar]) -> Result<Series> {
        ensure_periods(self.id(), self.min_periods(), bars.len())?;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Ok(rolling_mean(&closes, self.period))
    }
}

/// A set of SMAs computed together. The whole set needs enough bars for
/// its longest period.
pub struct MovingAverages {
    periods: Vec<usize>,
}

impl Default for MovingAverages {
    fn default() -> Self {
        Self {
            periods: vec![20, 50, 200],
        }
    }
}

impl MovingAverages {
    pub fn new(periods: Vec<usize>) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> &[usize] {
        &self.periods
    }
}

impl Indicator for MovingAverages {
    type Output = BTreeMap<usize, Series>;

    fn id(&self) -> &'static str {
        "moving_averages"
    }

    fn min_periods(&self) -> usize {
        self.periods.iter().copied().max().unwrap_or(1).max(1)
    }

    fn calculate(&self, bars: &[OhlcBar]) -> Result<Self::Output> {
        ensure_periods(self.id(), self.min_periods(), bars.len())?;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        Ok(self
            .periods
            .iter()
            .map(|&period| (period, rolling_mean(&closes, period)))
            .collect())
    }
}
