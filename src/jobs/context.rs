//! Job context for dependency injection

use crate::config::WorkerConfig;
use crate::metrics::Metrics;
use crate::models::subscription::SubscriptionKey;
use crate::services::market_data::MarketDataProvider;
use crate::services::notifier::Notifier;
use crate::store::SubscriptionStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Context passed to job handlers via Apalis Data<T> pattern
pub struct JobContext {
    pub data_provider: Arc<dyn MarketDataProvider>,
    pub store: Arc<dyn SubscriptionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: Option<Arc<Metrics>>,
    pub config: WorkerConfig,
    pub locks: SubjectLocks,
}

impl JobContext {
    pub fn new(
        data_provider: Arc<dyn MarketDataProvider>,
        store: Arc<dyn SubscriptionStore>,
        notifier: Arc<dyn Notifier>,
        metrics: Option<Arc<Metrics>>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            data_provider,
            store,
            notifier,
            metrics,
            config,
            locks: SubjectLocks::default(),
        }
    }
}

/// One async lock per subject, so that the read → evaluate → write of a
/// subject's cache never interleaves with another cycle for the same subject.
#[derive(Default)]
pub struct SubjectLocks {
    locks: Mutex<HashMap<SubscriptionKey, Arc<Mutex<()>>>>,
}

impl SubjectLocks {
    pub async fn lock_for(&self, key: &SubscriptionKey) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }

    /// Drop the lock for `key` unless another cycle still holds a handle.
    pub async fn prune(&self, key: &SubscriptionKey) {
        let mut locks = self.locks.lock().await;
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
