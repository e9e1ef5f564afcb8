use thiserror::Error;

/// Errors produced while deriving indicators from a candle window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: {actual} candles, at least {required} required")]
    InsufficientData { required: usize, actual: usize },
}
