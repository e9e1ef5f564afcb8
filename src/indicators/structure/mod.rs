pub mod fractals;
pub mod trend_line;

pub use fractals::*;
pub use trend_line::*;
