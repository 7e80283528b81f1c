//! Technical signal module.
//!
//! Provides indicator calculations over a bar series, the engine that runs
//! them together, and the aggregator that reduces them to one trading signal.

pub mod aggregator;
pub mod engine;
pub mod indicators;

pub use aggregator::SignalAggregator;
pub use engine::{IndicatorEngine, IndicatorSet};

use crate::error::{AppError, Result};
use crate::types::OhlcBar;

/// One value per bar; `None` marks bars still in warmup.
pub type Series = Vec<Option<f64>>;

/// Trait for implementing technical indicators.
pub trait Indicator {
    /// Calculated output, usually one or more per-bar series.
    type Output;

    /// Unique identifier for this indicator.
    fn id(&self) -> &'static str;

    /// Minimum number of bars required for calculation.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator from bar data.
    /// Returns `InsufficientData` when fewer than `min_periods` bars are given.
    fn calculate(&self, bars: &[OhlcBar]) -> Result<Self::Output>;
}

/// Fail with `InsufficientData` unless `available` covers `required`.
pub fn ensure_periods(indicator: &'static str, required: usize, available: usize) -> Result<()> {
    if available < required {
        return Err(AppError::InsufficientData {
            indicator,
            required,
            available,
        });
    }
    Ok(())
}
