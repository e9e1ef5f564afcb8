//! Market data provider interface.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::indicators::Candle;
use crate::models::subscription::Interval;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("market data request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("market data request rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid market data payload: {0}")]
    InvalidPayload(String),

    #[error("no market data for {0}")]
    Unavailable(String),
}

impl MarketDataError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MarketDataError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            MarketDataError::Status { status, .. } => *status == 429 || *status >= 500,
            MarketDataError::InvalidPayload(_) | MarketDataError::Unavailable(_) => false,
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Most recent `limit` candles in ascending open-time order. The final
    /// candle is the one still forming.
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;

    /// Current trade price for a symbol
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, MarketDataError>;
}

/// Fixed in-memory data, keyed by symbol and interval.
#[derive(Debug, Default, Clone)]
pub struct StaticMarketDataProvider {
    candles: HashMap<(String, Interval), Vec<Candle>>,
    prices: HashMap<String, f64>,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candles(mut self, symbol: &str, interval: Interval, candles: Vec<Candle>) -> Self {
        self.candles.insert((symbol.to_string(), interval), candles);
        self
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let candles = self
            .candles
            .get(&(symbol.to_string(), interval))
            .ok_or_else(|| MarketDataError::Unavailable(format!("{} {}", symbol, interval)))?;
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketDataError::Unavailable(symbol.to_string()))
    }
}
