//! Indicator snapshot for one evaluation window

use crate::indicators::error::IndicatorError;
use crate::indicators::structure::{find_fractals, project_latest};
use crate::indicators::trend::{calculate_sma, trend_direction};
use crate::models::indicators::{Candle, FractalSide, IndicatorSnapshot};

/// Minimum window length accepted by [`compute_indicators`].
pub const MIN_CANDLES: usize = 30;

pub const SLOW_MA_PERIOD: usize = 26;
pub const FAST_MA_PERIOD: usize = 7;

/// Compute moving averages, fractals and support/resistance for a window.
///
/// Support and resistance are projected to the index of the final candle,
/// which is the bar the live price belongs to.
pub fn compute_indicators(candles: &[Candle]) -> Result<IndicatorSnapshot, IndicatorError> {
    if candles.len() < MIN_CANDLES {
        return Err(IndicatorError::InsufficientData {
            required: MIN_CANDLES,
            actual: candles.len(),
        });
    }

    let insufficient = || IndicatorError::InsufficientData {
        required: MIN_CANDLES,
        actual: candles.len(),
    };
    let moving_average_26 = calculate_sma(candles, SLOW_MA_PERIOD).ok_or_else(insufficient)?;
    let moving_average_7 = calculate_sma(candles, FAST_MA_PERIOD).ok_or_else(insufficient)?;

    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let high_fractals = find_fractals(&highs, FractalSide::High);
    let low_fractals = find_fractals(&lows, FractalSide::Low);

    let current_index = candles.len() - 1;
    let resistance = project_latest(&high_fractals, current_index);
    let support = project_latest(&low_fractals, current_index);

    Ok(IndicatorSnapshot {
        moving_average_26,
        moving_average_7,
        trend: trend_direction(moving_average_7, moving_average_26),
        support,
        resistance,
        high_fractals,
        low_fractals,
        last_close: candles[current_index].close,
        prev_close: candles[current_index - 1].close,
    })
}
