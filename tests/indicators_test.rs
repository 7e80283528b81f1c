//! Integration tests for the indicator engine and signal aggregator

use aurum::services::signals::indicators::{Macd, MovingAverages, Rsi, SupportResistance};
use aurum::services::signals::Indicator;
use aurum::services::{IndicatorEngine, SignalAggregator};
use aurum::types::{BarSeries, OhlcBar, SignalType};
use aurum::AppError;

fn bars(closes: &[f64]) -> Vec<OhlcBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcBar {
            timestamp: 1_700_000_000_000 + i as i64 * 900_000,
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1_000.0,
        })
        .collect()
}

fn series(closes: &[f64]) -> BarSeries {
    BarSeries::new(bars(closes)).unwrap()
}

// =============================================================================
// RSI
// =============================================================================

#[test]
fn test_rsi_stays_in_range_for_mixed_moves() {
    let closes: Vec<f64> = (0..120)
        .map(|i| 1900.0 + (i as f64 * 0.7).sin() * 15.0 + i as f64 * 0.1)
        .collect();
    let rsi = Rsi::default().calculate(&bars(&closes)).unwrap();

    let defined: Vec<f64> = rsi.iter().flatten().copied().collect();
    assert!(!defined.is_empty());
    assert!(defined.iter().all(|v| (0.0..=100.0).contains(v)));
}

#[test]
fn test_rsi_is_100_without_losses() {
    let closes: Vec<f64> = (0..30).map(|i| 1900.0 + i as f64).collect();
    let rsi = Rsi::default().calculate(&bars(&closes)).unwrap();
    assert_eq!(rsi.last().copied().flatten(), Some(100.0));
}

#[test]
fn test_rsi_needs_period_plus_one_bars() {
    let closes = vec![1900.0; 14];
    let err = Rsi::default().calculate(&bars(&closes)).unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientData {
            required: 15,
            available: 14,
            ..
        }
    ));
}

// =============================================================================
// MACD and moving averages
// =============================================================================

#[test]
fn test_constant_series_has_flat_macd() {
    let closes = vec![1900.0; 60];
    let macd = Macd::default().calculate(&bars(&closes)).unwrap();

    let last = closes.len() - 1;
    assert_eq!(macd.line[last], Some(0.0));
    assert_eq!(macd.signal[last], Some(0.0));
    assert_eq!(macd.histogram[last], Some(0.0));
}

#[test]
fn test_macd_requires_slow_plus_signal_bars() {
    let closes = vec![1900.0; 34];
    assert!(Macd::default().calculate(&bars(&closes)).is_err());
    let closes = vec![1900.0; 35];
    assert!(Macd::default().calculate(&bars(&closes)).is_ok());
}

#[test]
fn test_moving_averages_need_longest_period() {
    let closes: Vec<f64> = (0..199).map(|i| 1900.0 + i as f64).collect();
    let err = MovingAverages::default().calculate(&bars(&closes)).unwrap_err();
    assert!(err.is_insufficient_data());
}

// =============================================================================
// Support and resistance
// =============================================================================

#[test]
fn test_levels_found_at_turning_points() {
    // Down for 15 bars, up for 15, down for 15.
    let mut closes: Vec<f64> = (0..15).map(|i| 1950.0 - i as f64 * 2.0).collect();
    closes.extend((0..15).map(|i| 1922.0 + i as f64 * 2.0));
    closes.extend((0..15).map(|i| 1950.0 - i as f64 * 2.0));

    let levels = SupportResistance::default().calculate(&bars(&closes)).unwrap();
    assert!(levels.support.contains(&(1922.0 - 0.5)));
    assert!(levels.resistance.contains(&(1950.0 + 0.5)));

    assert_eq!(levels.closest_support(1930.0), Some(1921.5));
    assert_eq!(levels.closest_resistance(1930.0), Some(1950.5));
    assert_eq!(levels.closest_resistance(1960.0), None);
}

// =============================================================================
// Composite signal
// =============================================================================

#[test]
fn test_constant_series_composite_is_zero() {
    let series = series(&vec![1900.0; 250]);
    let indicators = IndicatorEngine::default().compute(&series);
    let aggregator = SignalAggregator::default();

    let composite = aggregator.composite_series(&series, &indicators);
    assert_eq!(composite.last().copied().flatten(), Some(0.0));

    let summary = aggregator.signal_summary(&series, &indicators).unwrap();
    assert_eq!(summary.signal_type, SignalType::Neutral);
    assert_eq!(summary.strength, 0.0);
    assert_eq!(summary.macd, Some(0.0));
    // Every bar ties, so every low is support and every high resistance.
    assert_eq!(summary.closest_support, Some(1899.5));
    assert_eq!(summary.closest_resistance, Some(1900.5));
}

#[test]
fn test_rising_series_turns_bullish() {
    let closes: Vec<f64> = (0..220).map(|i| 1800.0 * 1.003f64.powi(i)).collect();
    let series = series(&closes);
    let indicators = IndicatorEngine::default().compute(&series);
    let aggregator = SignalAggregator::default();

    let summary = aggregator.signal_summary(&series, &indicators).unwrap();
    assert!(summary.moving_averages[&20] > summary.moving_averages[&50]);
    assert!(summary.macd.unwrap() > summary.macd_signal.unwrap());
    assert_eq!(summary.rsi, Some(100.0));

    // RSI votes against, MACD and MA vote for.
    let composite = aggregator.composite_series(&series, &indicators);
    let last = composite.last().copied().flatten().unwrap();
    assert!(last > 0.0);
    assert_eq!(summary.signal_type, SignalType::Buy);
}

#[test]
fn test_short_series_degrades_to_available_votes() {
    let closes: Vec<f64> = (0..40).map(|i| 1900.0 - i as f64).collect();
    let series = series(&closes);
    let indicators = IndicatorEngine::default().compute(&series);
    assert!(indicators.moving_averages.is_none());

    let summary = SignalAggregator::default()
        .signal_summary(&series, &indicators)
        .unwrap();
    assert!(summary.moving_averages.is_empty());
    // Oversold RSI (+1) against a falling MACD (-1).
    assert_eq!(summary.strength, 0.0);
}

#[test]
fn test_non_finite_close_is_rejected_before_indicators() {
    let mut closes: Vec<f64> = (0..60).map(|i| 1900.0 + (i % 7) as f64).collect();
    closes[50] = f64::NAN;

    let err = BarSeries::new(bars(&closes)).unwrap_err();
    assert!(matches!(err, AppError::InvalidSeries(msg) if msg.contains("index 50")));
}

#[test]
fn test_too_short_series_has_no_summary() {
    let series = series(&[1900.0, 1901.0, 1902.0]);
    let indicators = IndicatorEngine::default().compute(&series);
    assert!(SignalAggregator::default()
        .signal_summary(&series, &indicators)
        .is_none());
}
