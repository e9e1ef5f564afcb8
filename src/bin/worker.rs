//! Pivotwatch Worker
//!
//! Schedules one evaluation job per subscription on every tick and processes
//! those jobs from the Redis queue.

use apalis_redis::RedisStorage;
use dotenvy::dotenv;
use pivotwatch::config::{self, WorkerConfig};
use pivotwatch::core::runtime::SignalRuntime;
use pivotwatch::core::scheduler::JobScheduler;
use pivotwatch::jobs::context::JobContext;
use pivotwatch::jobs::types::EvaluateSubscriptionJob;
use pivotwatch::logging;
use pivotwatch::metrics::Metrics;
use pivotwatch::services::{
    BinanceMarketDataProvider, LogNotifier, MarketDataProvider, Notifier, TelegramNotifier,
};
use pivotwatch::store::{RedisSubscriptionStore, SubscriptionStore};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let worker_config = WorkerConfig::from_env();
    info!("Starting Pivotwatch Worker");
    info!(environment = %config::get_environment(), "Environment");

    if worker_config.evaluation_interval_seconds == 0 {
        return Err("EVAL_INTERVAL_SECONDS must be > 0 for worker".into());
    }
    info!(
        interval = worker_config.evaluation_interval_seconds,
        "Signal Evaluation: every {} seconds", worker_config.evaluation_interval_seconds
    );

    let metrics = Arc::new(Metrics::new()?);

    info!("Initializing Redis subscription store...");
    let store: Arc<dyn SubscriptionStore> = match RedisSubscriptionStore::new().await {
        Ok(store) => {
            metrics.store_connected.set(1);
            Arc::new(store)
        }
        Err(e) => {
            return Err(format!("Redis connection required for worker: {}", e).into());
        }
    };

    let notifier: Arc<dyn Notifier> = match config::get_telegram_bot_token() {
        Some(token) => {
            info!("Delivering signals through Telegram");
            Arc::new(TelegramNotifier::new(token))
        }
        None => {
            warn!("TELEGRAM_BOT_TOKEN not set, signals will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let data_provider: Arc<dyn MarketDataProvider> = Arc::new(BinanceMarketDataProvider::new());

    info!("Initializing Apalis Redis storage...");
    let conn = apalis_redis::connect(config::get_redis_url()).await?;
    let storage: Arc<RedisStorage<EvaluateSubscriptionJob>> = Arc::new(RedisStorage::new(conn));

    let interval_seconds = worker_config.evaluation_interval_seconds;
    let job_context = Arc::new(JobContext::new(
        data_provider,
        store.clone(),
        notifier,
        Some(metrics),
        worker_config,
    ));

    info!("Starting Apalis workers...");
    let runtime = SignalRuntime::new(job_context, storage.clone());
    let worker_handles = runtime
        .start_workers()
        .await
        .map_err(|e| format!("Failed to start workers: {}", e))?;

    info!("Starting job scheduler...");
    let scheduler = JobScheduler::new(storage, store, interval_seconds)
        .map_err(|e| format!("Failed to create scheduler: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start scheduler: {}", e))?;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down worker...");
    scheduler.stop().await;
    for handle in worker_handles {
        handle.abort();
    }
    info!("Worker stopped");

    Ok(())
}
