//! Redis implementation of the ephemeral store
//!
//! Uses a multiplexed async connection, created with exponential-backoff
//! retry at startup. Each trait operation maps to a single Redis command,
//! so the atomicity guarantees the domain relies on (SET NX EX, INCR)
//! come straight from Redis.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use ak_core::store::{EphemeralStore, StoreError, StoreResult};

use crate::config::CacheConfig;
use crate::InfrastructureError;

/// Redis-backed [`EphemeralStore`]
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to Redis, retrying with exponential backoff
    pub async fn connect(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| InfrastructureError::Config(format!("invalid redis url: {e}")))?;

        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;
        let connection = loop {
            attempts += 1;
            debug!(attempts, "connecting to redis");

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => break connection,
                Err(e) if attempts < config.max_retries => {
                    warn!(
                        attempts,
                        max = config.max_retries,
                        delay_ms = delay,
                        error = %e,
                        "redis connection failed, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Backoff capped at 5 seconds
                    delay = (delay * 2).min(5_000);
                }
                Err(e) => {
                    error!(attempts, error = %e, "redis connection failed");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        };

        info!("redis store connected");
        Ok(Self { connection })
    }

    fn conn(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

fn store_err(context: &str, e: redis::RedisError) -> StoreError {
    error!(error = %e, "redis {context} failed");
    StoreError::new(format!("redis {context} failed: {e}"))
}

#[async_trait]
impl EphemeralStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.conn()
            .get(key)
            .await
            .map_err(|e| store_err("get", e))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.conn()
            .set_ex(key, value, ttl.as_secs())
            .await
            .map_err(|e| store_err("set", e))
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        // SET key value NX EX ttl replies OK or nil
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut self.conn())
            .await
            .map_err(|e| store_err("set-nx", e))?;
        Ok(reply.is_some())
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        self.conn()
            .incr(key, 1)
            .await
            .map_err(|e| store_err("incr", e))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        self.conn()
            .expire(key, ttl.as_secs() as i64)
            .await
            .map_err(|e| store_err("expire", e))
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        // TTL replies -2 for a missing key, -1 for a key without expiry
        let seconds: i64 = self
            .conn()
            .ttl(key)
            .await
            .map_err(|e| store_err("ttl", e))?;
        Ok((seconds > 0).then(|| Duration::from_secs(seconds as u64)))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let removed: i64 = self
            .conn()
            .del(key)
            .await
            .map_err(|e| store_err("del", e))?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.conn()
            .exists(key)
            .await
            .map_err(|e| store_err("exists", e))
    }
}
