//! Redis-backed subscription store
//!
//! All subscriptions live in one hash; the field is the subscription key and
//! the value its JSON encoding.

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::collections::HashMap;

use super::{StoreError, SubscriptionStore};
use crate::config;
use crate::models::signal::SignalCache;
use crate::models::subscription::{Subscription, SubscriptionKey};

const DEFAULT_HASH_KEY: &str = "pivotwatch:subscriptions";

/// HSET only when the field still exists, so a concurrent delete wins.
const SET_IF_PRESENT: &str = r"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
";

#[derive(Clone)]
pub struct RedisSubscriptionStore {
    conn: ConnectionManager,
    hash_key: String,
}

impl RedisSubscriptionStore {
    pub async fn new() -> Result<Self, StoreError> {
        Self::connect(&config::get_redis_url()).await
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            hash_key: DEFAULT_HASH_KEY.to_string(),
        })
    }

    pub fn with_hash_key(mut self, hash_key: impl Into<String>) -> Self {
        self.hash_key = hash_key.into();
        self
    }
}

#[async_trait]
impl SubscriptionStore for RedisSubscriptionStore {
    async fn list(&self) -> Result<Vec<Subscription>, StoreError> {
        let mut conn = self.conn.clone();
        let entries: HashMap<String, String> = conn.hgetall(&self.hash_key).await?;

        let mut subscriptions = entries
            .values()
            .map(|json| serde_json::from_str::<Subscription>(json))
            .collect::<Result<Vec<_>, _>>()?;
        subscriptions.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(subscriptions)
    }

    async fn get(&self, key: &SubscriptionKey) -> Result<Option<Subscription>, StoreError> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.hget(&self.hash_key, key.to_string()).await?;
        json.map(|j| serde_json::from_str(&j))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn upsert(&self, subscription: Subscription) -> Result<(), StoreError> {
        let json = serde_json::to_string(&subscription)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .hset(&self.hash_key, subscription.key.to_string(), json)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &SubscriptionKey) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.hdel(&self.hash_key, key.to_string()).await?;
        Ok(removed > 0)
    }

    async fn save_cache(&self, key: &SubscriptionKey, cache: SignalCache) -> Result<bool, StoreError> {
        let Some(mut subscription) = self.get(key).await? else {
            return Ok(false);
        };
        subscription.signal_cache = cache;
        subscription.updated_at = Utc::now();
        let json = serde_json::to_string(&subscription)?;

        let mut conn = self.conn.clone();
        let written: i64 = Script::new(SET_IF_PRESENT)
            .key(&self.hash_key)
            .arg(key.to_string())
            .arg(json)
            .invoke_async(&mut conn)
            .await?;
        Ok(written == 1)
    }
}
