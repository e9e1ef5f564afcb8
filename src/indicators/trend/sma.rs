//! SMA (Simple Moving Average) over candle closes

use crate::models::indicators::{Candle, TrendDirection};

/// Arithmetic mean of the closes of the last `period` candles.
pub fn calculate_sma(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }

    let window = &candles[candles.len() - period..];
    let sum: f64 = window.iter().map(|c| c.close).sum();
    Some(sum / period as f64)
}

/// Classify trend from a fast and a slow average
pub fn trend_direction(fast: f64, slow: f64) -> TrendDirection {
    if fast > slow {
        TrendDirection::Up
    } else if fast < slow {
        TrendDirection::Down
    } else {
        TrendDirection::Sideways
    }
}
