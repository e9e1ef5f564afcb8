//! Pivotwatch API Server
//!
//! HTTP API for managing subscriptions, plus health, metrics and live
//! indicator endpoints. Runs separately from the worker.

use dotenvy::dotenv;
use pivotwatch::config;
use pivotwatch::core::http::{start_server, AppState, HealthStatus};
use pivotwatch::logging;
use pivotwatch::metrics::Metrics;
use pivotwatch::services::{BinanceMarketDataProvider, MarketDataProvider};
use pivotwatch::store::{InMemorySubscriptionStore, RedisSubscriptionStore, SubscriptionStore};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let port = config::get_port();
    let worker_config = config::WorkerConfig::from_env();
    info!("Starting Pivotwatch API Server");
    info!(environment = %config::get_environment(), "Environment");

    let metrics = Arc::new(Metrics::new()?);

    let store: Arc<dyn SubscriptionStore> = match RedisSubscriptionStore::new().await {
        Ok(store) => {
            info!("Redis connected");
            metrics.store_connected.set(1);
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis, subscriptions are kept in memory only");
            Arc::new(InMemorySubscriptionStore::new())
        }
    };

    let market_data: Arc<dyn MarketDataProvider> = Arc::new(BinanceMarketDataProvider::new());

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
        store,
        market_data: Some(market_data),
        klines_limit: worker_config.klines_limit,
    };

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
