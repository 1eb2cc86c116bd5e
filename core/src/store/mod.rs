//! Ephemeral TTL-keyed store contract
//!
//! Verification codes, cooldown markers, failure counters, lock records
//! and session records all live in a shared key/value store with
//! per-key expiry. The domain layer only depends on this trait; the
//! production implementation is Redis-backed (`ak_infra`), tests use the
//! in-memory store from [`memory`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::DomainError;

pub mod memory;

pub use memory::InMemoryStore;

/// Failure talking to the backing store
#[derive(Debug, Clone, Error)]
#[error("ephemeral store failure: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::internal(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value store with per-key time-to-live
///
/// Keys expire passively: an expired key behaves exactly like an absent
/// one for every operation.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Value for `key`, or `None` if absent or expired
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Set `key` to `value`, replacing any previous value and TTL
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Atomically set `key` only if it is absent
    ///
    /// Returns `true` if the key was set, `false` if a live value was
    /// already present (in which case value and TTL are untouched).
    async fn set_if_absent_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> StoreResult<bool>;

    /// Atomically increment the integer at `key`, treating an absent key
    /// as 0, and return the new value. The key is created without a TTL.
    async fn increment(&self, key: &str) -> StoreResult<i64>;

    /// Set the TTL of an existing key; `false` if the key is absent
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    /// Remaining TTL of `key`; `None` if the key is absent or has no
    /// expiry
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Delete `key`; `true` if a live value was removed
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Whether a live value exists at `key`
    async fn exists(&self, key: &str) -> StoreResult<bool>;
}
