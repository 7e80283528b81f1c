//! Exponential Moving Average (EMA) indicator.

use crate::error::Result;
use crate::services::signals::{ensure_periods, Indicator, Series};
use crate::types::OhlcBar;

/// EMA recurrence seeded with the first value:
/// `ema[0] = v[0]`, `ema[i] = a * v[i] + (1 - a) * ema[i - 1]`, `a = 2 / (period + 1)`.
pub fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());

    for (i, &value) in values.iter().enumerate() {
        // prev + a * (v - prev) keeps a flat input exactly flat
        let next = if i == 0 {
            value
        } else {
            let prev: f64 = out[i - 1];
            prev + alpha * (value - prev)
        };
        out.push(next);
    }

    out
}

/// EMA (Exponential Moving Average) of closing prices.
///
/// The recurrence runs from the first bar, but the first `period - 1`
/// values are reported as warmup.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Ema {
    type Output = Series;

    fn id(&self) -> &'static str {
        "ema"
    }

    fn min_periods(&self) -> usize {
        self.period.max(1)
    }

    fn calculate(&self, bars: &[OhlcBar]) -> Result<Series> {
        ensure_periods(self.id(), self.min_periods(), bars.len())?;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let warmup = self.min_periods() - 1;

        Ok(ema_values(&closes, self.period)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i >= warmup).then_some(v))
            .collect())
    }
}
