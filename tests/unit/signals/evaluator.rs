//! Unit tests for signal evaluation and deduplication

use pivotwatch::indicators::compute_indicators;
use pivotwatch::models::indicators::{Fractal, FractalSide, IndicatorSnapshot, TrendDirection};
use pivotwatch::models::signal::{SignalCache, SignalKind};
use pivotwatch::signals::evaluate_signals;

use crate::test_utils::{
    descending_resistance_candles, flat_candles, ma_cross_candles, BAR_MS, BASE_TIME,
};

fn kinds(signals: &[pivotwatch::models::signal::Signal]) -> Vec<SignalKind> {
    signals.iter().map(|s| s.kind).collect()
}

fn bare_snapshot(prev_close: f64, moving_average_26: f64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        moving_average_26,
        moving_average_7: moving_average_26,
        trend: TrendDirection::Sideways,
        support: None,
        resistance: None,
        high_fractals: Vec::new(),
        low_fractals: Vec::new(),
        last_close: prev_close,
        prev_close,
    }
}

fn last_open_time(count: usize) -> i64 {
    BASE_TIME + (count as i64 - 1) * BAR_MS
}

#[test]
fn ma_buy_fires_once_per_period() {
    let candles = flat_candles(35, 100.0);
    let snapshot = bare_snapshot(99.0, 100.0);

    let first = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(101.0));
    assert_eq!(kinds(&first.new_signals), vec![SignalKind::MaBuy]);
    assert_eq!(first.updated_cache.period_timestamp, last_open_time(35));
    assert!(first.updated_cache.contains(SignalKind::MaBuy));

    let second = evaluate_signals(&snapshot, first.updated_cache.clone(), &candles, Some(101.0));
    assert!(second.new_signals.is_empty());
    assert_eq!(second.updated_cache, first.updated_cache);
}

#[test]
fn ma_sell_on_downward_cross() {
    let candles = flat_candles(35, 100.0);
    let snapshot = bare_snapshot(101.0, 100.0);
    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(99.0));
    assert_eq!(kinds(&evaluation.new_signals), vec![SignalKind::MaSell]);
}

#[test]
fn descending_resistance_breakout_emits_trend_buy() {
    let candles = flat_candles(35, 100.0);
    let mut snapshot = bare_snapshot(90.0, 150.0);
    snapshot.high_fractals = vec![
        Fractal { index: 10, value: 120.0, side: FractalSide::High },
        Fractal { index: 20, value: 110.0, side: FractalSide::High },
    ];

    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(100.0));
    assert_eq!(kinds(&evaluation.new_signals), vec![SignalKind::TrendBuy]);
}

#[test]
fn breakout_needs_previous_close_below_line() {
    let candles = flat_candles(35, 100.0);
    let mut snapshot = bare_snapshot(98.0, 150.0);
    snapshot.high_fractals = vec![
        Fractal { index: 10, value: 120.0, side: FractalSide::High },
        Fractal { index: 20, value: 110.0, side: FractalSide::High },
    ];

    // Line is at 97 on the previous bar; 98 was already above it.
    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(100.0));
    assert!(evaluation.new_signals.is_empty());
}

#[test]
fn ascending_support_breakdown_emits_trend_sell() {
    let candles = flat_candles(35, 100.0);
    let mut snapshot = bare_snapshot(110.0, 50.0);
    snapshot.low_fractals = vec![
        Fractal { index: 10, value: 80.0, side: FractalSide::Low },
        Fractal { index: 20, value: 90.0, side: FractalSide::Low },
    ];

    // Support sits at 103 on the previous bar and 104 on the current one.
    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(100.0));
    assert_eq!(kinds(&evaluation.new_signals), vec![SignalKind::TrendSell]);
}

#[test]
fn trend_buy_from_real_window() {
    let candles = descending_resistance_candles();
    let snapshot = compute_indicators(&candles).unwrap();
    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(101.0));
    assert_eq!(kinds(&evaluation.new_signals), vec![SignalKind::TrendBuy]);
}

#[test]
fn simultaneous_candidates_are_all_emitted() {
    let mut candles = ma_cross_candles();
    candles[32].high = 105.0;
    let snapshot = compute_indicators(&candles).unwrap();

    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(101.0));
    assert_eq!(
        kinds(&evaluation.new_signals),
        vec![SignalKind::InfoPeakHigh, SignalKind::MaBuy]
    );
    assert_eq!(evaluation.new_signals[0].fractal_index, Some(32));
    assert!(evaluation.updated_cache.contains(SignalKind::InfoPeakHigh));
    assert!(evaluation.updated_cache.contains(SignalKind::MaBuy));
    assert_eq!(evaluation.updated_cache.sent_kinds.len(), 2);
}

#[test]
fn lower_high_is_a_line_candidate() {
    let mut candles = flat_candles(35, 100.0);
    candles[20].high = 120.0;
    candles[32].high = 110.0;
    let snapshot = compute_indicators(&candles).unwrap();

    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(100.0));
    assert_eq!(kinds(&evaluation.new_signals), vec![SignalKind::InfoLineHigh]);
    assert_eq!(evaluation.new_signals[0].fractal_index, Some(32));
}

#[test]
fn low_pivots_classified_against_predecessor() {
    let mut candles = flat_candles(35, 100.0);
    candles[32].low = 90.0;
    let snapshot = compute_indicators(&candles).unwrap();
    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(100.0));
    assert_eq!(kinds(&evaluation.new_signals), vec![SignalKind::InfoPeakLow]);

    candles[20].low = 80.0;
    let snapshot = compute_indicators(&candles).unwrap();
    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(100.0));
    assert_eq!(kinds(&evaluation.new_signals), vec![SignalKind::InfoLineLow]);
}

#[test]
fn unconfirmed_fractal_is_ignored() {
    let mut candles = flat_candles(35, 100.0);
    // Index 33 needs bars 34 and 35 before it counts.
    candles[33].high = 130.0;
    let snapshot = compute_indicators(&candles).unwrap();
    let evaluation = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(100.0));
    assert!(evaluation.new_signals.is_empty());
}

#[test]
fn new_period_resets_sent_kinds() {
    let mut candles = flat_candles(35, 100.0);
    let snapshot = bare_snapshot(99.0, 100.0);

    let first = evaluate_signals(&snapshot, SignalCache::default(), &candles, Some(101.0));
    assert_eq!(kinds(&first.new_signals), vec![SignalKind::MaBuy]);

    candles[34].open_time += BAR_MS;
    let rolled = evaluate_signals(&snapshot, first.updated_cache, &candles, Some(101.0));
    assert_eq!(kinds(&rolled.new_signals), vec![SignalKind::MaBuy]);
    assert_eq!(rolled.updated_cache.period_timestamp, candles[34].open_time);
    assert_eq!(rolled.updated_cache.sent_kinds.len(), 1);
}

#[test]
fn period_rollover_restamps_even_without_signals() {
    let candles = flat_candles(35, 100.0);
    let snapshot = bare_snapshot(100.0, 100.0);
    let mut stale = SignalCache::new(42);
    stale.record(SignalKind::TrendSell);

    let evaluation = evaluate_signals(&snapshot, stale, &candles, Some(100.0));
    assert!(evaluation.new_signals.is_empty());
    assert_eq!(evaluation.updated_cache, SignalCache::new(last_open_time(35)));
}

#[test]
fn cache_only_grows_within_a_period() {
    let candles = flat_candles(35, 100.0);
    let snapshot = bare_snapshot(99.0, 100.0);
    let mut cache = SignalCache::new(last_open_time(35));
    cache.record(SignalKind::TrendSell);
    cache.record(SignalKind::InfoPeakLow);

    let evaluation = evaluate_signals(&snapshot, cache.clone(), &candles, Some(101.0));
    assert!(evaluation.updated_cache.sent_kinds.is_superset(&cache.sent_kinds));
    assert_eq!(kinds(&evaluation.new_signals), vec![SignalKind::MaBuy]);
}

#[test]
fn already_sent_kind_is_suppressed_for_another_fractal() {
    let mut candles = flat_candles(35, 100.0);
    candles[32].high = 110.0;
    let snapshot = compute_indicators(&candles).unwrap();
    let mut cache = SignalCache::new(last_open_time(35));
    cache.record(SignalKind::InfoPeakHigh);

    let evaluation = evaluate_signals(&snapshot, cache.clone(), &candles, Some(100.0));
    assert!(evaluation.new_signals.is_empty());
    assert_eq!(evaluation.updated_cache, cache);
}

#[test]
fn too_few_candles_leave_cache_untouched() {
    let candles = flat_candles(4, 100.0);
    let snapshot = bare_snapshot(99.0, 100.0);
    let mut cache = SignalCache::new(7);
    cache.record(SignalKind::MaSell);

    let evaluation = evaluate_signals(&snapshot, cache.clone(), &candles, Some(101.0));
    assert!(evaluation.new_signals.is_empty());
    assert_eq!(evaluation.updated_cache, cache);

    let evaluation = evaluate_signals(&snapshot, cache.clone(), &[], Some(101.0));
    assert!(evaluation.new_signals.is_empty());
    assert_eq!(evaluation.updated_cache, cache);
}

#[test]
fn missing_live_price_leaves_cache_untouched() {
    let candles = flat_candles(35, 100.0);
    let snapshot = bare_snapshot(99.0, 100.0);
    let cache = SignalCache::new(7);

    let evaluation = evaluate_signals(&snapshot, cache.clone(), &candles, None);
    assert!(evaluation.new_signals.is_empty());
    assert_eq!(evaluation.updated_cache, cache);

    let evaluation = evaluate_signals(&snapshot, cache.clone(), &candles, Some(f64::NAN));
    assert!(evaluation.new_signals.is_empty());
    assert_eq!(evaluation.updated_cache, cache);
}
