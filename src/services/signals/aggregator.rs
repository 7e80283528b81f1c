//! Reduces indicator outputs to one composite trading signal.

use super::IndicatorSet;
use crate::config::IndicatorConfig;
use crate::types::{BarSeries, IndicatorSnapshot, SignalSummary, SignalType, SubSignals};
use tracing::{debug, info};

/// Moving-average pair compared for the crossover vote.
pub const MA_FAST_PERIOD: usize = 20;
pub const MA_SLOW_PERIOD: usize = 50;

/// Composite signal builder.
///
/// Each bar gets up to three votes in {-1, 0, +1}:
/// - RSI: +1 when oversold, -1 when overbought
/// - MACD: +1 when the line is above its signal line, -1 when below
/// - MA: +1 when MA20 is above MA50, -1 when below
///
/// A vote whose inputs are absent or non-finite is dropped, not counted as
/// zero.
pub struct SignalAggregator {
    rsi_overbought: f64,
    rsi_oversold: f64,
}

impl Default for SignalAggregator {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

impl SignalAggregator {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            rsi_overbought: config.rsi_overbought,
            rsi_oversold: config.rsi_oversold,
        }
    }

    /// Votes for a single bar.
    pub fn sub_signals(&self, snapshot: &IndicatorSnapshot) -> SubSignals {
        let rsi = snapshot.rsi.filter(|v| v.is_finite()).map(|rsi| {
            if rsi < self.rsi_oversold {
                1
            } else if rsi > self.rsi_overbought {
                -1
            } else {
                0
            }
        });

        let macd = snapshot
            .macd
            .and_then(|m| crossover_vote(m.line, m.signal));

        let moving_average = match (
            snapshot.moving_averages.get(&MA_FAST_PERIOD),
            snapshot.moving_averages.get(&MA_SLOW_PERIOD),
        ) {
            (Some(&fast), Some(&slow)) => crossover_vote(fast, slow),
            _ => None,
        };

        SubSignals {
            rsi,
            macd,
            moving_average,
        }
    }

    /// Composite signal per bar, `None` where no vote is available.
    pub fn composite_series(&self, series: &BarSeries, indicators: &IndicatorSet) -> Vec<Option<f64>> {
        indicators
            .snapshots(series)
            .iter()
            .map(|snapshot| self.sub_signals(snapshot).composite())
            .collect()
    }

    /// Summary of the latest bar. `None` when the series is empty or no
    /// indicator has warmed up yet.
    pub fn signal_summary(&self, series: &BarSeries, indicators: &IndicatorSet) -> Option<SignalSummary> {
        let snapshot = indicators.latest(series)?;

        let composite = match self.sub_signals(&snapshot).composite() {
            Some(value) => value,
            None => {
                debug!("No sub-signal available for the latest bar");
                return None;
            }
        };

        let signal_type = SignalType::from_composite(composite);
        let price = snapshot.close;
        let levels = indicators.levels.clone().unwrap_or_default();

        let summary = SignalSummary {
            timestamp: snapshot.timestamp,
            signal_type,
            strength: composite.abs(),
            price,
            rsi: snapshot.rsi,
            macd: snapshot.macd.map(|m| m.line),
            macd_signal: snapshot.macd.map(|m| m.signal),
            macd_histogram: snapshot.macd.map(|m| m.histogram),
            moving_averages: snapshot.moving_averages,
            closest_support: levels.closest_support(price),
            closest_resistance: levels.closest_resistance(price),
            support_levels: levels.support,
            resistance_levels: levels.resistance,
        };

        info!(
            "Signal summary generated: {} with strength {:.2}",
            summary.signal_type, summary.strength
        );

        Some(summary)
    }
}

/// +1 above, -1 below, 0 when exactly equal (flat input). `None` when
/// either side is not a finite number.
fn crossover_vote(value: f64, reference: f64) -> Option<i8> {
    if !value.is_finite() || !reference.is_finite() {
        return None;
    }

    Some(if value > reference {
        1
    } else if value < reference {
        -1
    } else {
        0
    })
}
