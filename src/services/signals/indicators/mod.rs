//! Technical indicator implementations.

pub mod ema;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::Ema;
pub use levels::{Levels, SupportResistance};
pub use macd::{Macd, MacdSeries};
pub use rsi::Rsi;
pub use sma::{MovingAverages, Sma};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::OhlcBar;

    /// Bars with the given closes; high/low straddle the close by one unit.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcBar {
                timestamp: 1_000_000 + i as i64 * 60_000,
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    pub fn uptrend(count: usize) -> Vec<OhlcBar> {
        let closes: Vec<f64> = (0..count).map(|i| 100.0 + i as f64 * 1.5).collect();
        bars_from_closes(&closes)
    }

    pub fn downtrend(count: usize) -> Vec<OhlcBar> {
        let closes: Vec<f64> = (0..count).map(|i| 400.0 - i as f64 * 1.5).collect();
        bars_from_closes(&closes)
    }
}
