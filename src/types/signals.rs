use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Direction of the composite trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    Neutral,
}

impl SignalType {
    /// Composite values above this are BUY, below its negation SELL.
    pub const THRESHOLD: f64 = 0.2;

    /// Classify a composite signal in [-1, 1].
    pub fn from_composite(value: f64) -> Self {
        if value > Self::THRESHOLD {
            SignalType::Buy
        } else if value < -Self::THRESHOLD {
            SignalType::Sell
        } else {
            SignalType::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MACD values at a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Indicator values at a single bar. Absent values are still warming up
/// or could not be computed from the available history.
///
/// Support and resistance levels describe the whole series rather than one
/// bar, so they are not repeated here: they live on `IndicatorSet::levels`
/// and are carried into `SignalSummary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub timestamp: i64,
    pub close: f64,
    pub rsi: Option<f64>,
    pub macd: Option<MacdPoint>,
    /// Moving average value keyed by period. Periods still in warmup are omitted.
    pub moving_averages: BTreeMap<usize, f64>,
}

/// Per-bar votes feeding the composite signal. `None` means the inputs were
/// missing and the vote is excluded entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSignals {
    pub rsi: Option<i8>,
    pub macd: Option<i8>,
    pub moving_average: Option<i8>,
}

impl SubSignals {
    /// Mean of the available votes, or `None` when no vote is available.
    pub fn composite(&self) -> Option<f64> {
        let votes: Vec<i8> = [self.rsi, self.macd, self.moving_average]
            .into_iter()
            .flatten()
            .collect();

        if votes.is_empty() {
            return None;
        }

        let sum: i32 = votes.iter().map(|&v| v as i32).sum();
        Some(sum as f64 / votes.len() as f64)
    }
}

/// Point-in-time reduction of all indicators to one actionable signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub timestamp: i64,
    pub signal_type: SignalType,
    /// Absolute composite value in [0, 1].
    pub strength: f64,
    pub price: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub moving_averages: BTreeMap<usize, f64>,
    pub closest_support: Option<f64>,
    pub closest_resistance: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub support_levels: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resistance_levels: Vec<f64>,
}
