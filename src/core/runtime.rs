//! Apalis worker setup for subscription evaluation jobs

use crate::jobs::context::JobContext;
use crate::jobs::handlers;
use crate::jobs::types::EvaluateSubscriptionJob;
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use std::sync::Arc;
use tracing::info;

/// Runtime that sets up the Apalis evaluation workers
pub struct SignalRuntime {
    job_context: Arc<JobContext>,
    storage: Arc<RedisStorage<EvaluateSubscriptionJob>>,
    concurrency: usize,
}

impl SignalRuntime {
    pub fn new(
        job_context: Arc<JobContext>,
        storage: Arc<RedisStorage<EvaluateSubscriptionJob>>,
    ) -> Self {
        let concurrency = job_context.config.concurrency.max(1);
        Self {
            job_context,
            storage,
            concurrency,
        }
    }

    /// Start all workers and return handles for graceful shutdown
    pub async fn start_workers(
        &self,
    ) -> Result<Vec<tokio::task::JoinHandle<()>>, Box<dyn std::error::Error + Send + Sync>> {
        info!(
            concurrency = self.concurrency,
            "SignalRuntime: starting Apalis workers with concurrency {}",
            self.concurrency
        );

        let mut handles = Vec::with_capacity(self.concurrency);
        for i in 0..self.concurrency {
            let storage = (*self.storage).clone();
            let job_context = self.job_context.clone();
            let handle = tokio::spawn(async move {
                let worker = WorkerBuilder::new(format!("evaluate-subscription-worker-{}", i))
                    .data(job_context)
                    .backend(storage)
                    .build_fn(handlers::handle_evaluate_subscription);

                info!(worker = i, "SignalRuntime: evaluation worker started");
                worker.run().await;
            });
            handles.push(handle);
        }

        info!("SignalRuntime: all workers started");
        Ok(handles)
    }
}
