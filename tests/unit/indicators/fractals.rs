//! Unit tests for fractal detection

use pivotwatch::indicators::structure::{find_fractals, preceding_fractal};
use pivotwatch::models::indicators::{Fractal, FractalSide};

use crate::test_utils::{flat_candles, highs};

fn indices(fractals: &[Fractal]) -> Vec<usize> {
    fractals.iter().map(|f| f.index).collect()
}

#[test]
fn spike_is_confirmed_only_after_two_more_bars() {
    let mut candles = flat_candles(35, 100.0);
    candles[30].high = 110.0;
    let values = highs(&candles);

    // Bars 0..=31: index 30 lacks its second confirming bar.
    assert!(find_fractals(&values[..32], FractalSide::High).is_empty());

    let confirmed = find_fractals(&values[..33], FractalSide::High);
    assert_eq!(
        confirmed,
        vec![Fractal {
            index: 30,
            value: 110.0,
            side: FractalSide::High
        }]
    );

    assert_eq!(indices(&find_fractals(&values, FractalSide::High)), vec![30]);
}

#[test]
fn flat_run_has_no_fractals() {
    let values = vec![5.0; 9];
    assert!(find_fractals(&values, FractalSide::High).is_empty());
    assert!(find_fractals(&values, FractalSide::Low).is_empty());
}

#[test]
fn plateau_edges_are_accepted() {
    let values = vec![1.0, 2.0, 5.0, 5.0, 5.0, 2.0, 1.0];
    // The middle of the plateau beats neither immediate neighbour.
    assert_eq!(indices(&find_fractals(&values, FractalSide::High)), vec![2, 4]);
}

#[test]
fn low_fractals_mirror_high_rule() {
    let values = vec![10.0, 9.0, 7.0, 8.0, 9.0, 9.0, 6.0, 6.5, 8.0];
    let lows = find_fractals(&values, FractalSide::Low);
    assert_eq!(indices(&lows), vec![2, 6]);
    assert!(lows.iter().all(|f| f.side == FractalSide::Low));
}

#[test]
fn short_series_has_no_fractals() {
    assert!(find_fractals(&[1.0, 3.0, 1.0, 0.0], FractalSide::High).is_empty());
    assert!(find_fractals(&[], FractalSide::Low).is_empty());
}

#[test]
fn detection_is_deterministic_and_ordered() {
    let values: Vec<f64> = (0..60).map(|i| ((i as f64) * 0.7).sin() * 10.0 + 100.0).collect();
    let first = find_fractals(&values, FractalSide::High);
    let second = find_fractals(&values, FractalSide::High);
    assert_eq!(first, second);
    assert!(!first.is_empty());
    assert!(first.windows(2).all(|w| w[0].index < w[1].index));
}

#[test]
fn preceding_fractal_skips_same_and_later_indices() {
    let fractals = vec![
        Fractal { index: 4, value: 1.0, side: FractalSide::High },
        Fractal { index: 9, value: 2.0, side: FractalSide::High },
        Fractal { index: 15, value: 3.0, side: FractalSide::High },
    ];
    assert_eq!(preceding_fractal(&fractals, 15).map(|f| f.index), Some(9));
    assert_eq!(preceding_fractal(&fractals, 10).map(|f| f.index), Some(9));
    assert!(preceding_fractal(&fractals, 4).is_none());
}
