//! Signal evaluation engine: indicators followed by deduplicated evaluation.

use crate::indicators::{compute_indicators, IndicatorError};
use crate::models::indicators::{Candle, IndicatorSnapshot};
use crate::models::signal::{Evaluation, SignalCache};
use crate::signals::evaluator::evaluate_signals;

pub use crate::indicators::MIN_CANDLES;

pub struct SignalEngine;

impl SignalEngine {
    /// Run one evaluation cycle for a subject.
    ///
    /// `Err` means the window could not produce indicators and the cycle must
    /// be skipped; the cache is neither reset nor persisted in that case.
    pub fn evaluate(
        candles: &[Candle],
        cache: SignalCache,
        live_price: Option<f64>,
    ) -> Result<Evaluation, IndicatorError> {
        Self::evaluate_with_indicators(candles, cache, live_price).map(|(evaluation, _)| evaluation)
    }

    /// Evaluate and also return the snapshot (for API responses/debugging)
    pub fn evaluate_with_indicators(
        candles: &[Candle],
        cache: SignalCache,
        live_price: Option<f64>,
    ) -> Result<(Evaluation, IndicatorSnapshot), IndicatorError> {
        let snapshot = compute_indicators(candles)?;
        let evaluation = evaluate_signals(&snapshot, cache, candles, live_price);
        Ok((evaluation, snapshot))
    }
}
