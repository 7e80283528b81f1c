//! Support and resistance levels from local price extremes.

use crate::error::Result;
use crate::services::signals::{ensure_periods, Indicator};
use crate::types::OhlcBar;
use serde::{Deserialize, Serialize};

/// Support and resistance prices in left-to-right scan order.
/// Equal prices from different bars are all kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

impl Levels {
    /// Highest support strictly below `price`.
    pub fn closest_support(&self, price: f64) -> Option<f64> {
        self.support
            .iter()
            .copied()
            .filter(|&level| level < price)
            .reduce(f64::max)
    }

    /// Lowest resistance strictly above `price`.
    pub fn closest_resistance(&self, price: f64) -> Option<f64> {
        self.resistance
            .iter()
            .copied()
            .filter(|&level| level > price)
            .reduce(f64::min)
    }
}

/// Local-extreme scanner.
///
/// Bar `i` is support when its low is at or below the low of every bar up to
/// `window` positions away on both sides; ties count. Resistance is the same
/// test on highs. Only bars with a full window on both sides are scanned.
pub struct SupportResistance {
    window: usize,
}

impl Default for SupportResistance {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl SupportResistance {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    fn is_extreme(values: &[f64], i: usize, window: usize, beats: impl Fn(f64, f64) -> bool) -> bool {
        (1..=window).all(|j| beats(values[i], values[i - j]) && beats(values[i], values[i + j]))
    }
}

impl Indicator for SupportResistance {
    type Output = Levels;

    fn id(&self) -> &'static str {
        "support_resistance"
    }

    fn min_periods(&self) -> usize {
        (self.window * 2).max(1)
    }

    fn calculate(&self, bars: &[OhlcBar]) -> Result<Levels> {
        ensure_periods(self.id(), self.min_periods(), bars.len())?;

        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let mut levels = Levels::default();

        for i in self.window..bars.len().saturating_sub(self.window) {
            if Self::is_extreme(&lows, i, self.window, |v, other| v <= other) {
                levels.support.push(lows[i]);
            }
            if Self::is_extreme(&highs, i, self.window, |v, other| v >= other) {
                levels.resistance.push(highs[i]);
            }
        }

        Ok(levels)
    }
}
