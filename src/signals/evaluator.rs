//! Classification of candidate signals and per-period deduplication.

use crate::indicators::structure::{last_two, line_value, preceding_fractal};
use crate::models::indicators::{Candle, Fractal, FractalSide, IndicatorSnapshot};
use crate::models::signal::{Evaluation, Signal, SignalCache, SignalKind};

/// Below this many candles no fractal can be confirmed.
pub const MIN_EVALUATION_CANDLES: usize = 5;

/// Evaluate the snapshot against the live price and return the signals not
/// yet sent in the current period together with the cache to persist.
///
/// A missing or non-finite live price, or a window shorter than
/// [`MIN_EVALUATION_CANDLES`], yields no signals and the cache untouched.
pub fn evaluate_signals(
    snapshot: &IndicatorSnapshot,
    cache: SignalCache,
    candles: &[Candle],
    live_price: Option<f64>,
) -> Evaluation {
    let Some(price) = live_price.filter(|p| p.is_finite()) else {
        return Evaluation::unchanged(cache);
    };
    let Some(last) = candles.last() else {
        return Evaluation::unchanged(cache);
    };
    if candles.len() < MIN_EVALUATION_CANDLES {
        return Evaluation::unchanged(cache);
    }

    let mut cache = cache.for_period(last.open_time);
    let mut new_signals = Vec::new();

    for signal in candidate_signals(snapshot, candles.len(), price) {
        if cache.record(signal.kind) {
            new_signals.push(signal);
        }
    }

    Evaluation {
        new_signals,
        updated_cache: cache,
    }
}

/// Every signal the window would fire, in emission order: fractal info
/// (high, low), moving-average cross, trend-line breakout.
fn candidate_signals(snapshot: &IndicatorSnapshot, len: usize, price: f64) -> Vec<Signal> {
    let Some(confirmed_index) = len.checked_sub(3) else {
        return Vec::new();
    };

    [
        fractal_info(&snapshot.high_fractals, confirmed_index, FractalSide::High),
        fractal_info(&snapshot.low_fractals, confirmed_index, FractalSide::Low),
        ma_cross(snapshot, price),
        resistance_breakout(&snapshot.high_fractals, snapshot.prev_close, price, len),
        support_breakdown(&snapshot.low_fractals, snapshot.prev_close, price, len),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn fractal_info(fractals: &[Fractal], confirmed_index: usize, side: FractalSide) -> Option<Signal> {
    let fractal = fractals.iter().find(|f| f.index == confirmed_index)?;
    let previous = preceding_fractal(fractals, confirmed_index);

    let signal = match (side, previous) {
        (FractalSide::High, Some(prev)) if fractal.value <= prev.value => Signal::new(
            SignalKind::InfoLineHigh,
            format!(
                "New high fractal {:.2} below previous {:.2}: descending resistance line forming",
                fractal.value, prev.value
            ),
        ),
        (FractalSide::High, _) => Signal::new(
            SignalKind::InfoPeakHigh,
            format!(
                "New high fractal {:.2}: higher peak, resistance line broken or absent",
                fractal.value
            ),
        ),
        (FractalSide::Low, Some(prev)) if fractal.value >= prev.value => Signal::new(
            SignalKind::InfoLineLow,
            format!(
                "New low fractal {:.2} above previous {:.2}: ascending support line forming",
                fractal.value, prev.value
            ),
        ),
        (FractalSide::Low, _) => Signal::new(
            SignalKind::InfoPeakLow,
            format!(
                "New low fractal {:.2}: lower trough, support line broken or absent",
                fractal.value
            ),
        ),
    };

    Some(signal.with_fractal_index(fractal.index))
}

fn ma_cross(snapshot: &IndicatorSnapshot, price: f64) -> Option<Signal> {
    let ma = snapshot.moving_average_26;
    let prev = snapshot.prev_close;

    if prev < ma && ma <= price {
        Some(Signal::new(
            SignalKind::MaBuy,
            format!("BUY: price {:.2} crossed above MA26 {:.2}", price, ma),
        ))
    } else if prev > ma && ma >= price {
        Some(Signal::new(
            SignalKind::MaSell,
            format!("SELL: price {:.2} crossed below MA26 {:.2}", price, ma),
        ))
    } else {
        None
    }
}

fn resistance_breakout(highs: &[Fractal], prev_close: f64, price: f64, len: usize) -> Option<Signal> {
    let (p1, p2) = last_two(highs)?;
    if p2.value >= p1.value {
        return None;
    }

    let line_prev = line_value(p1, p2, len - 2)?;
    let line_now = line_value(p1, p2, len - 1)?;
    if prev_close < line_prev && price > line_now {
        Some(Signal::new(
            SignalKind::TrendBuy,
            format!(
                "BUY: price {:.2} broke above descending resistance {:.2}",
                price, line_now
            ),
        ))
    } else {
        None
    }
}

fn support_breakdown(lows: &[Fractal], prev_close: f64, price: f64, len: usize) -> Option<Signal> {
    let (p1, p2) = last_two(lows)?;
    if p2.value <= p1.value {
        return None;
    }

    let line_prev = line_value(p1, p2, len - 2)?;
    let line_now = line_value(p1, p2, len - 1)?;
    if prev_close > line_prev && price < line_now {
        Some(Signal::new(
            SignalKind::TrendSell,
            format!(
                "SELL: price {:.2} broke below ascending support {:.2}",
                price, line_now
            ),
        ))
    } else {
        None
    }
}
