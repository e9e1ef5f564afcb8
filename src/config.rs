//! Environment-driven configuration.

use std::env;
use std::time::Duration;

use crate::models::subscription::Interval;

/// Symbols a subscription may watch.
pub const SUPPORTED_SYMBOLS: [&str; 4] = ["BTCUSDT", "ETHUSDT", "SOLUSDT", "JUPUSDT"];

pub const DEFAULT_BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string())
}

pub fn get_binance_base_url() -> String {
    env::var("BINANCE_BASE_URL").unwrap_or_else(|_| DEFAULT_BINANCE_BASE_URL.to_string())
}

pub fn get_telegram_api_url() -> String {
    env::var("TELEGRAM_API_URL").unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string())
}

pub fn get_telegram_bot_token() -> Option<String> {
    env::var("TELEGRAM_BOT_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
}

pub fn is_supported_symbol(symbol: &str) -> bool {
    SUPPORTED_SYMBOLS.contains(&symbol)
}

pub fn supported_intervals() -> &'static [Interval] {
    &Interval::ALL
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Settings for the evaluation worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub evaluation_interval_seconds: u64,
    pub klines_limit: usize,
    pub notify_delay: Duration,
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            evaluation_interval_seconds: 60,
            klines_limit: 200,
            notify_delay: Duration::from_millis(200),
            concurrency: 4,
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            evaluation_interval_seconds: parse_var("EVAL_INTERVAL_SECONDS")
                .unwrap_or(defaults.evaluation_interval_seconds),
            klines_limit: parse_var("KLINES_LIMIT").unwrap_or(defaults.klines_limit),
            notify_delay: parse_var("NOTIFY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.notify_delay),
            concurrency: parse_var("WORKER_CONCURRENCY").unwrap_or(defaults.concurrency),
        }
    }
}

pub fn get_port() -> u16 {
    parse_var("PORT").unwrap_or(8080)
}
