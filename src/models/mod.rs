//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;
pub mod subscription;

pub use indicators::{Candle, Fractal, FractalSide, IndicatorSnapshot, TrendDirection};
pub use signal::{Evaluation, Signal, SignalCache, SignalKind};
pub use subscription::{Interval, ParseIntervalError, Subscription, SubscriptionKey};
