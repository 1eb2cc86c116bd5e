//! In-memory ephemeral store
//!
//! Backed by a mutex-guarded map; every operation runs under the lock,
//! which gives the same atomicity the Redis commands provide. Expiry is
//! checked lazily on access against `tokio::time::Instant`, so tests can
//! drive it with a paused clock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{EphemeralStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Ephemeral store held entirely in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Drop `key` if its entry has expired, then return whether a live entry
/// remains
fn purge(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) -> bool {
    match entries.get(key) {
        Some(entry) if entry.is_expired(now) => {
            entries.remove(key);
            false
        }
        Some(_) => true,
        None => false,
    }
}

#[async_trait]
impl EphemeralStore for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(poisoned)?;
        if !purge(&mut entries, key, now) {
            return Ok(None);
        }
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(now + ttl),
            },
        );
        Ok(())
    }

    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(poisoned)?;
        if purge(&mut entries, key, now) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(now + ttl),
            },
        );
        Ok(true)
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(poisoned)?;
        purge(&mut entries, key, now);
        let entry = entries.entry(key.to_string()).or_insert(Entry {
            value: "0".to_string(),
            expires_at: None,
        });
        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| StoreError::new(format!("non-integer value at {key}")))?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(poisoned)?;
        if !purge(&mut entries, key, now) {
            return Ok(false);
        }
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(now + ttl);
        }
        Ok(true)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(poisoned)?;
        if !purge(&mut entries, key, now) {
            return Ok(None);
        }
        Ok(entries
            .get(key)
            .and_then(|e| e.expires_at)
            .map(|at| at.duration_since(now)))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(poisoned)?;
        if !purge(&mut entries, key, now) {
            return Ok(false);
        }
        Ok(entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(poisoned)?;
        Ok(purge(&mut entries, key, now))
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::new("store mutex poisoned")
}
