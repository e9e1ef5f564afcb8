//! Signal evaluation interfaces.

pub mod engine;
pub mod evaluator;

pub use engine::SignalEngine;
pub use evaluator::*;
