//! Fractal pivot detection
//!
//! A fractal at `i` compares against the two values on each side, so it is
//! only confirmed once `i + 2` exists. Plateaued pivots are accepted as long
//! as the pivot strictly beats at least one immediate neighbour.

use crate::models::indicators::{Fractal, FractalSide};

/// Find every confirmed fractal in `values`, in ascending index order.
pub fn find_fractals(values: &[f64], side: FractalSide) -> Vec<Fractal> {
    if values.len() < 5 {
        return Vec::new();
    }

    (2..=values.len() - 3)
        .filter(|&i| is_fractal(values, i, side))
        .map(|i| Fractal {
            index: i,
            value: values[i],
            side,
        })
        .collect()
}

fn is_fractal(values: &[f64], i: usize, side: FractalSide) -> bool {
    let v = values[i];
    let neighbours = [values[i - 2], values[i - 1], values[i + 1], values[i + 2]];
    let (prev, next) = (values[i - 1], values[i + 1]);

    match side {
        FractalSide::High => neighbours.iter().all(|&n| v >= n) && (v > prev || v > next),
        FractalSide::Low => neighbours.iter().all(|&n| v <= n) && (v < prev || v < next),
    }
}

/// The last fractal strictly before `index`.
pub fn preceding_fractal(fractals: &[Fractal], index: usize) -> Option<&Fractal> {
    fractals.iter().rev().find(|f| f.index < index)
}
