//! Trend lines projected through two same-side fractals

use crate::models::indicators::Fractal;

/// Value at index `x` of the line through `p1` and `p2`.
///
/// Returns `None` when both fractals share an index.
pub fn line_value(p1: &Fractal, p2: &Fractal, x: usize) -> Option<f64> {
    if p1.index == p2.index {
        return None;
    }

    let slope = (p2.value - p1.value) / (p2.index as f64 - p1.index as f64);
    Some(slope * (x as f64 - p1.index as f64) + p1.value)
}

/// The two most recent fractals, oldest first.
pub fn last_two(fractals: &[Fractal]) -> Option<(&Fractal, &Fractal)> {
    match fractals {
        [.., p1, p2] => Some((p1, p2)),
        _ => None,
    }
}

/// Project the line through the two most recent fractals to index `x`.
pub fn project_latest(fractals: &[Fractal], x: usize) -> Option<f64> {
    let (p1, p2) = last_two(fractals)?;
    line_value(p1, p2, x)
}
