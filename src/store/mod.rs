//! Persistence of subscriptions and their signal caches.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::signal::SignalCache;
use crate::models::subscription::{Subscription, SubscriptionKey};

pub use memory::InMemorySubscriptionStore;
pub use redis_store::RedisSubscriptionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("failed to (de)serialize subscription: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Subscription>, StoreError>;

    async fn get(&self, key: &SubscriptionKey) -> Result<Option<Subscription>, StoreError>;

    /// Insert or replace the subscription stored under its key.
    async fn upsert(&self, subscription: Subscription) -> Result<(), StoreError>;

    /// Returns `false` when nothing was stored under `key`.
    async fn delete(&self, key: &SubscriptionKey) -> Result<bool, StoreError>;

    /// Replace the signal cache of an existing subscription.
    ///
    /// Returns `false` when the subscription no longer exists.
    async fn save_cache(&self, key: &SubscriptionKey, cache: SignalCache) -> Result<bool, StoreError>;
}
