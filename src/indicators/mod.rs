pub mod error;
pub mod snapshot;

pub mod structure;
pub mod trend;

pub use error::IndicatorError;
pub use snapshot::*;
