use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{StoreError, SubscriptionStore};
use crate::models::signal::SignalCache;
use crate::models::subscription::{Subscription, SubscriptionKey};

/// Process-local store, used in tests and when Redis is not configured.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: RwLock<BTreeMap<SubscriptionKey, Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn list(&self) -> Result<Vec<Subscription>, StoreError> {
        Ok(self.subscriptions.read().await.values().cloned().collect())
    }

    async fn get(&self, key: &SubscriptionKey) -> Result<Option<Subscription>, StoreError> {
        Ok(self.subscriptions.read().await.get(key).cloned())
    }

    async fn upsert(&self, subscription: Subscription) -> Result<(), StoreError> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.key.clone(), subscription);
        Ok(())
    }

    async fn delete(&self, key: &SubscriptionKey) -> Result<bool, StoreError> {
        Ok(self.subscriptions.write().await.remove(key).is_some())
    }

    async fn save_cache(&self, key: &SubscriptionKey, cache: SignalCache) -> Result<bool, StoreError> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get_mut(key) {
            Some(subscription) => {
                subscription.signal_cache = cache;
                subscription.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
