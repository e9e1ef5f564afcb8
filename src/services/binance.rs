//! Binance spot REST market data provider

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config;
use crate::models::indicators::Candle;
use crate::models::subscription::Interval;
use crate::services::market_data::{MarketDataError, MarketDataProvider};

const KLINES_PATH: &str = "/api/v3/klines";
const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

pub struct BinanceMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
    min_retry_delay: Duration,
}

impl BinanceMarketDataProvider {
    pub fn new() -> Self {
        Self::with_client(config::get_binance_base_url(), reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: 3,
            min_retry_delay: Duration::from_millis(250),
        }
    }

    pub fn with_retries(mut self, max_retries: usize, min_retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.min_retry_delay = min_retry_delay;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_retry_delay)
            .with_max_times(self.max_retries);

        (|| async { self.get_json_once::<T>(path, query).await })
            .retry(backoff)
            .when(MarketDataError::is_transient)
            .notify(|err, delay| {
                warn!(path = %path, error = %err, ?delay, "Binance request failed, retrying");
            })
            .await
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| MarketDataError::InvalidPayload(e.to_string()))
    }
}

impl Default for BinanceMarketDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for BinanceMarketDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let rows: Vec<Vec<Value>> = self
            .get_json(
                KLINES_PATH,
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let mut candles = rows
            .iter()
            .map(|row| parse_kline(row))
            .collect::<Result<Vec<_>, _>>()?;
        candles.sort_by_key(|c| c.open_time);

        debug!(symbol = %symbol, interval = %interval, count = candles.len(), "fetched klines");
        Ok(candles)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let ticker: TickerPrice = self
            .get_json(TICKER_PRICE_PATH, &[("symbol", symbol.to_string())])
            .await?;
        parse_number(&Value::String(ticker.price), "price")
    }
}

/// Parse one kline row: `[openTime, open, high, low, close, volume, ...]`,
/// prices encoded as decimal strings.
pub fn parse_kline(row: &[Value]) -> Result<Candle, MarketDataError> {
    if row.len() < 6 {
        return Err(MarketDataError::InvalidPayload(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| MarketDataError::InvalidPayload(format!("invalid open time: {}", row[0])))?;

    Ok(Candle {
        open_time,
        open: parse_number(&row[1], "open")?,
        high: parse_number(&row[2], "high")?,
        low: parse_number(&row[3], "low")?,
        close: parse_number(&row[4], "close")?,
        volume: parse_number(&row[5], "volume")?,
    })
}

fn parse_number(value: &Value, field: &str) -> Result<f64, MarketDataError> {
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| MarketDataError::InvalidPayload(format!("invalid {}: {}", field, value)))
}
