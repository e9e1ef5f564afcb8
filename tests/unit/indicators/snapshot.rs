//! Unit tests for the indicator snapshot

use pivotwatch::indicators::trend::{calculate_sma, trend_direction};
use pivotwatch::indicators::{compute_indicators, IndicatorError, MIN_CANDLES};
use pivotwatch::models::indicators::TrendDirection;

use crate::test_utils::{descending_resistance_candles, flat_candles, ma_cross_candles, set_price};

#[test]
fn short_windows_are_rejected() {
    for count in 0..MIN_CANDLES {
        let candles = flat_candles(count, 100.0);
        assert_eq!(
            compute_indicators(&candles),
            Err(IndicatorError::InsufficientData {
                required: 30,
                actual: count
            })
        );
    }
    assert!(compute_indicators(&flat_candles(MIN_CANDLES, 100.0)).is_ok());
}

#[test]
fn moving_average_uses_last_26_closes() {
    let mut candles = flat_candles(40, 50.0);
    // Outside the 26-bar window.
    set_price(&mut candles, 5, 1_000.0);
    for i in 14..40 {
        set_price(&mut candles, i, i as f64);
    }

    let snapshot = compute_indicators(&candles).unwrap();
    let expected = (14..40).sum::<usize>() as f64 / 26.0;
    assert!((snapshot.moving_average_26 - expected).abs() < 1e-9);
    assert_eq!(snapshot.last_close, 39.0);
    assert_eq!(snapshot.prev_close, 38.0);
    assert_eq!(snapshot.trend, TrendDirection::Up);
}

#[test]
fn sma_requires_full_period() {
    let candles = flat_candles(5, 10.0);
    assert!(calculate_sma(&candles, 6).is_none());
    assert!(calculate_sma(&candles, 0).is_none());
    assert_eq!(calculate_sma(&candles, 5), Some(10.0));
}

#[test]
fn trend_direction_compares_fast_and_slow() {
    assert_eq!(trend_direction(2.0, 1.0), TrendDirection::Up);
    assert_eq!(trend_direction(1.0, 2.0), TrendDirection::Down);
    assert_eq!(trend_direction(1.0, 1.0), TrendDirection::Sideways);
}

#[test]
fn resistance_is_projected_to_current_bar() {
    let snapshot = compute_indicators(&descending_resistance_candles()).unwrap();
    assert_eq!(snapshot.high_fractals.len(), 2);
    assert_eq!(snapshot.resistance, Some(96.0));
    assert!(snapshot.low_fractals.is_empty());
    assert!(snapshot.support.is_none());
    assert_eq!(snapshot.prev_close, 90.0);
}

#[test]
fn support_requires_two_low_fractals() {
    let mut candles = flat_candles(35, 100.0);
    candles[12].low = 90.0;
    let snapshot = compute_indicators(&candles).unwrap();
    assert_eq!(snapshot.low_fractals.len(), 1);
    assert!(snapshot.support.is_none());

    candles[22].low = 95.0;
    let snapshot = compute_indicators(&candles).unwrap();
    assert_eq!(snapshot.low_fractals.len(), 2);
    // Rises 0.5 per bar from 95 at index 22.
    assert_eq!(snapshot.support, Some(101.0));
}

#[test]
fn ma_cross_window_has_exact_average() {
    let snapshot = compute_indicators(&ma_cross_candles()).unwrap();
    assert_eq!(snapshot.moving_average_26, 100.0);
    assert_eq!(snapshot.prev_close, 99.0);
    assert!(snapshot.high_fractals.is_empty());
    assert!(snapshot.low_fractals.is_empty());
}
