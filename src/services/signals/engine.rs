//! Runs every configured indicator over a bar series.

use super::indicators::{Levels, Macd, MacdSeries, MovingAverages, Rsi, SupportResistance};
use super::{Indicator, Series};
use crate::config::IndicatorConfig;
use crate::error::Result;
use crate::types::{BarSeries, IndicatorSnapshot, MacdPoint};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Indicator outputs for one bar series. An indicator without enough history
/// is `None` here rather than an error.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    pub rsi: Option<Series>,
    pub macd: Option<MacdSeries>,
    pub moving_averages: Option<BTreeMap<usize, Series>>,
    pub levels: Option<Levels>,
}

impl IndicatorSet {
    /// Indicator values at bar `index`.
    pub fn snapshot(&self, series: &BarSeries, index: usize) -> Option<IndicatorSnapshot> {
        let bar = series.bars().get(index)?;

        let rsi = self.rsi.as_ref().and_then(|values| values[index]);

        let macd = self.macd.as_ref().and_then(|m| {
            match (m.line[index], m.signal[index], m.histogram[index]) {
                (Some(line), Some(signal), Some(histogram)) => Some(MacdPoint {
                    line,
                    signal,
                    histogram,
                }),
                _ => None,
            }
        });

        let moving_averages = self
            .moving_averages
            .iter()
            .flatten()
            .filter_map(|(&period, values)| values[index].map(|v| (period, v)))
            .collect();

        Some(IndicatorSnapshot {
            timestamp: bar.timestamp,
            close: bar.close,
            rsi,
            macd,
            moving_averages,
        })
    }

    /// Snapshot for every bar, in series order.
    pub fn snapshots(&self, series: &BarSeries) -> Vec<IndicatorSnapshot> {
        (0..series.len())
            .filter_map(|i| self.snapshot(series, i))
            .collect()
    }

    /// Snapshot for the most recent bar.
    pub fn latest(&self, series: &BarSeries) -> Option<IndicatorSnapshot> {
        series
            .len()
            .checked_sub(1)
            .and_then(|last| self.snapshot(series, last))
    }
}

/// Technical indicator engine.
pub struct IndicatorEngine {
    rsi: Rsi,
    macd: Macd,
    moving_averages: MovingAverages,
    levels: SupportResistance,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(&IndicatorConfig::default())
    }
}

impl IndicatorEngine {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            rsi: Rsi::new(config.rsi_period),
            macd: Macd::new(config.macd_fast, config.macd_slow, config.macd_signal),
            moving_averages: MovingAverages::new(config.moving_average_periods.clone()),
            levels: SupportResistance::new(config.level_window),
        }
    }

    /// Compute all indicators. Never fails: missing history only leaves the
    /// affected indicator absent.
    pub fn compute(&self, series: &BarSeries) -> IndicatorSet {
        let bars = series.bars();
        debug!("Computing indicators over {} bars", bars.len());

        IndicatorSet {
            rsi: absent_on_error(self.rsi.id(), self.rsi.calculate(bars)),
            macd: absent_on_error(self.macd.id(), self.macd.calculate(bars)),
            moving_averages: absent_on_error(
                self.moving_averages.id(),
                self.moving_averages.calculate(bars),
            ),
            levels: absent_on_error(self.levels.id(), self.levels.calculate(bars)),
        }
    }
}

fn absent_on_error<T>(id: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_insufficient_data() => {
            debug!("{} unavailable: {}", id, e);
            None
        }
        Err(e) => {
            warn!("{} failed: {}", id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OhlcBar;

    fn series(closes: &[f64]) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcBar {
                timestamp: i as i64 * 60_000,
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 10.0,
            })
            .collect();
        BarSeries::new(bars).unwrap()
    }

    #[test]
    fn test_short_series_leaves_indicators_absent() {
        let set = IndicatorEngine::default().compute(&series(&[1.0; 10]));
        assert!(set.rsi.is_none());
        assert!(set.macd.is_none());
        assert!(set.moving_averages.is_none());
        assert!(set.levels.is_none());
    }

    #[test]
    fn test_partial_history_computes_what_it_can() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i % 5) as f64).collect();
        let set = IndicatorEngine::default().compute(&series(&closes));
        assert!(set.rsi.is_some());
        assert!(set.macd.is_some());
        assert!(set.levels.is_some());
        assert!(set.moving_averages.is_none());
    }

    #[test]
    fn test_snapshot_omits_warming_averages() {
        let closes: Vec<f64> = (0..210).map(|i| 100.0 + i as f64).collect();
        let series = series(&closes);
        let set = IndicatorEngine::default().compute(&series);

        let early = set.snapshot(&series, 30).unwrap();
        assert!(early.moving_averages.contains_key(&20));
        assert!(!early.moving_averages.contains_key(&50));

        let latest = set.latest(&series).unwrap();
        assert_eq!(latest.moving_averages.len(), 3);
        assert_eq!(latest.close, 309.0);
        assert!(latest.macd.is_some());
        assert_eq!(set.snapshots(&series).len(), 210);
    }
}
