//! Relative Strength Index (RSI) indicator.

use super::sma::rolling_mean;
use crate::error::Result;
use crate::services::signals::{ensure_periods, Indicator, Series};
use crate::types::OhlcBar;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
///
/// Average gain and loss are plain rolling means over `period` price changes,
/// not Wilder smoothing.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// RSI from average gain and loss. A window with no movement at all has
    /// no defined RSI.
    fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
        if avg_loss == 0.0 {
            return (avg_gain > 0.0).then_some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }
}

impl Indicator for Rsi {
    type Output = Series;

    fn id(&self) -> &'static str {
        "rsi"
    }

    fn min_periods(&self) -> usize {
        self.period.max(1) + 1
    }

    fn calculate(&self, bars: &[OhlcBar]) -> Result<Series> {
        ensure_periods(self.id(), self.min_periods(), bars.len())?;

        let mut gains = Vec::with_capacity(bars.len() - 1);
        let mut losses = Vec::with_capacity(bars.len() - 1);

        for pair in bars.windows(2) {
            let change = pair[1].close - pair[0].close;
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let avg_gains = rolling_mean(&gains, self.period);
        let avg_losses = rolling_mean(&losses, self.period);

        // Bar i corresponds to change i - 1; the first bar has no change.
        let mut out = Vec::with_capacity(bars.len());
        out.push(None);
        for (gain, loss) in avg_gains.into_iter().zip(avg_losses) {
            out.push(match (gain, loss) {
                (Some(g), Some(l)) => Self::rsi_value(g, l),
                _ => None,
            });
        }

        Ok(out)
    }
}
