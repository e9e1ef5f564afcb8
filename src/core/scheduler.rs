//! Cron-based scheduler for enqueuing subscription evaluation jobs

use crate::jobs::types::EvaluateSubscriptionJob;
use crate::store::SubscriptionStore;
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Cron expression (with seconds field) firing every `interval_seconds`.
///
/// Only intervals that evenly divide a minute, an hour or a day keep a
/// constant gap between ticks; anything else returns `None`.
pub fn cron_expression(interval_seconds: u64) -> Option<String> {
    const DAY: u64 = 24 * 3600;
    match interval_seconds {
        0 => None,
        s if s < 60 => (60 % s == 0).then(|| format!("*/{} * * * * *", s)),
        s if s < 3600 => {
            (s % 60 == 0 && 60 % (s / 60) == 0).then(|| format!("0 */{} * * * *", s / 60))
        }
        s if s < DAY => {
            (s % 3600 == 0 && 24 % (s / 3600) == 0).then(|| format!("0 0 */{} * * *", s / 3600))
        }
        DAY => Some("0 0 0 * * *".to_string()),
        _ => None,
    }
}

/// Scheduler that periodically enqueues one EvaluateSubscriptionJob per
/// stored subscription
pub struct JobScheduler {
    storage: Arc<RedisStorage<EvaluateSubscriptionJob>>,
    store: Arc<dyn SubscriptionStore>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl JobScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `storage` - Redis storage backend for jobs
    /// * `store` - Source of the subscriptions to evaluate on each tick
    /// * `interval_seconds` - Evaluation interval in seconds (0 = disabled)
    pub fn new(
        storage: Arc<RedisStorage<EvaluateSubscriptionJob>>,
        store: Arc<dyn SubscriptionStore>,
        interval_seconds: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if interval_seconds == 0 {
            return Err("Scheduler disabled: interval_seconds is 0".into());
        }

        let cron_expr = cron_expression(interval_seconds).ok_or_else(|| {
            format!(
                "Unsupported interval {}s: must evenly divide a minute, an hour or a day",
                interval_seconds
            )
        })?;
        let schedule = Schedule::from_str(&cron_expr)
            .map_err(|e| format!("Invalid cron expression '{}': {}", cron_expr, e))?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "JobScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            storage,
            store,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let storage = self.storage.clone();
        let store = self.store.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("JobScheduler: started, waiting for cron schedule...");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                enqueue_all(&storage, store.as_ref()).await;
            }
        });

        *self.handle.write().await = Some(handle);

        info!("JobScheduler: started successfully");
        Ok(())
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("JobScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }

    /// Enqueue one job per stored subscription now, returning how many were
    /// pushed.
    pub async fn tick(&self) -> usize {
        enqueue_all(&self.storage, self.store.as_ref()).await
    }
}

async fn enqueue_all(
    storage: &Arc<RedisStorage<EvaluateSubscriptionJob>>,
    store: &dyn SubscriptionStore,
) -> usize {
    let subscriptions = match store.list().await {
        Ok(subscriptions) => subscriptions,
        Err(e) => {
            error!(error = %e, "JobScheduler: failed to list subscriptions");
            return 0;
        }
    };

    info!(
        subscription_count = subscriptions.len(),
        "JobScheduler: cron tick, enqueuing {} subscriptions",
        subscriptions.len()
    );

    let mut enqueued = 0;
    for subscription in subscriptions {
        let key = subscription.key;
        let mut storage = (**storage).clone();
        match storage.push(EvaluateSubscriptionJob { key: key.clone() }).await {
            Ok(_) => {
                enqueued += 1;
                debug!(subscription = %key, "JobScheduler: enqueued EvaluateSubscriptionJob");
            }
            Err(e) => {
                error!(
                    subscription = %key,
                    error = %e,
                    "JobScheduler: failed to enqueue EvaluateSubscriptionJob for {}",
                    key
                );
            }
        }
    }
    enqueued
}
