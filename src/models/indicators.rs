use serde::{Deserialize, Serialize};

/// One OHLC bar. `open_time` (epoch milliseconds) identifies the bar's period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(open_time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalSide {
    High,
    Low,
}

/// A confirmed local pivot at `index` within the evaluated window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    pub index: usize,
    pub value: f64,
    pub side: FractalSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

/// Indicators derived from a single window. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub moving_average_26: f64,
    pub moving_average_7: f64,
    pub trend: TrendDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    pub high_fractals: Vec<Fractal>,
    pub low_fractals: Vec<Fractal>,
    pub last_close: f64,
    pub prev_close: f64,
}

impl IndicatorSnapshot {
    pub fn summary(&self) -> String {
        format!(
            "MA7: {:.2}, MA26: {:.2}, Trend: {:?}",
            self.moving_average_7, self.moving_average_26, self.trend
        )
    }
}
