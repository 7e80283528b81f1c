//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::ema_values;
use crate::error::Result;
use crate::services::signals::{ensure_periods, Indicator, Series};
use crate::types::OhlcBar;

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// Per-bar MACD output.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Indicator for Macd {
    type Output = MacdSeries;

    fn id(&self) -> &'static str {
        "macd"
    }

    fn min_periods(&self) -> usize {
        (self.slow_period + self.signal_period).max(1)
    }

    fn calculate(&self, bars: &[OhlcBar]) -> Result<MacdSeries> {
        ensure_periods(self.id(), self.min_periods(), bars.len())?;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_values(&closes, self.fast_period);
        let slow = ema_values(&closes, self.slow_period);

        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_values(&line, self.signal_period);

        // The line is usable once the slow EMA has seen a full period, the
        // signal once it has additionally seen a full signal period.
        let line_warmup = self.slow_period.saturating_sub(1);
        let signal_warmup = (self.slow_period + self.signal_period).saturating_sub(2);

        let mut out = MacdSeries {
            line: Vec::with_capacity(closes.len()),
            signal: Vec::with_capacity(closes.len()),
            histogram: Vec::with_capacity(closes.len()),
        };

        for i in 0..closes.len() {
            out.line.push((i >= line_warmup).then_some(line[i]));
            if i >= signal_warmup {
                out.signal.push(Some(signal[i]));
                out.histogram.push(Some(line[i] - signal[i]));
            } else {
                out.signal.push(None);
                out.histogram.push(None);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::indicators::test_support::{
        bars_from_closes, downtrend, uptrend,
    };

    #[test]
    fn test_macd_min_periods() {
        assert_eq!(Macd::default().min_periods(), 35);
    }

    #[test]
    fn test_macd_insufficient_data() {
        let err = Macd::default().calculate(&uptrend(34)).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_macd_constant_price_is_zero() {
        let result = Macd::default().calculate(&bars_from_closes(&[1900.0; 60])).unwrap();
        assert_eq!(result.line[59], Some(0.0));
        assert_eq!(result.signal[59], Some(0.0));
        assert_eq!(result.histogram[59], Some(0.0));
    }

    #[test]
    fn test_macd_warmup_boundaries() {
        let result = Macd::default().calculate(&uptrend(35)).unwrap();
        assert!(result.line[24].is_none());
        assert!(result.line[25].is_some());
        assert!(result.signal[32].is_none());
        assert!(result.signal[33].is_some());
        assert!(result.histogram[34].is_some());
    }

    #[test]
    fn test_macd_uptrend_line_above_signal() {
        let result = Macd::default().calculate(&uptrend(80)).unwrap();
        let line = result.line[79].unwrap();
        let signal = result.signal[79].unwrap();
        assert!(line > 0.0);
        assert!(line > signal);
    }

    #[test]
    fn test_macd_downtrend_line_negative() {
        let result = Macd::default().calculate(&downtrend(80)).unwrap();
        assert!(result.line[79].unwrap() < 0.0);
        assert!(result.histogram[79].unwrap() < 0.0);
    }
}
