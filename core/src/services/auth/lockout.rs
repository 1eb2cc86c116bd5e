//! Login failure tracking and account lockout
//!
//! Failures accumulate in a windowed counter at
//! `login:fail:count:{mobile}`; when the threshold is reached the caller
//! locks the account, which writes a record at `login:lock:{mobile}`
//! whose TTL is the lock itself. Unlock happens passively by expiry, or
//! explicitly via [`LockoutTracker::unlock`] for operators.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ak_shared::config::LoginPolicy;
use ak_shared::utils::mobile::mask_mobile;

use crate::errors::{DomainError, DomainResult};
use crate::store::EphemeralStore;

/// Lock record stored for the duration of a lock
#[derive(Debug, Serialize, Deserialize)]
struct LockRecord {
    lock_until: DateTime<Utc>,
    reason: String,
    fail_count: u32,
}

/// Tracks failed logins and enforces account locks
pub struct LockoutTracker<S: EphemeralStore> {
    store: Arc<S>,
    max_fail_attempts: u32,
    lock_duration_minutes: u64,
    fail_window_minutes: u64,
}

impl<S: EphemeralStore> LockoutTracker<S> {
    pub fn new(store: Arc<S>, policy: &LoginPolicy) -> Self {
        Self {
            store,
            max_fail_attempts: policy.max_fail_attempts,
            lock_duration_minutes: policy.lock_duration_minutes,
            fail_window_minutes: policy.fail_window_minutes,
        }
    }

    fn fail_key(mobile: &str) -> String {
        format!("login:fail:count:{mobile}")
    }

    fn lock_key(mobile: &str) -> String {
        format!("login:lock:{mobile}")
    }

    /// Failures needed to trigger a lock
    pub fn max_fail_attempts(&self) -> u32 {
        self.max_fail_attempts
    }

    /// Remaining lock duration to report to clients, in minutes
    pub fn lock_duration_minutes(&self) -> u64 {
        self.lock_duration_minutes
    }

    /// Record one failed attempt and return the running count
    ///
    /// The window TTL is set when the counter is created, so the count
    /// resets `fail_window_minutes` after the first failure in a streak.
    pub async fn record_failure(&self, mobile: &str) -> DomainResult<u32> {
        let key = Self::fail_key(mobile);
        let count = self.store.increment(&key).await?;
        if count == 1 {
            self.store
                .expire(&key, Duration::from_secs(self.fail_window_minutes * 60))
                .await?;
        }
        warn!(
            mobile = %mask_mobile(mobile),
            attempts = count,
            "login failure recorded"
        );
        Ok(count.max(0) as u32)
    }

    /// Lock the account for the full policy duration
    ///
    /// Idempotent; locking an already locked account refreshes the TTL
    /// and overwrites the record.
    pub async fn lock(&self, mobile: &str, reason: &str, fail_count: u32) -> DomainResult<()> {
        let duration = ChronoDuration::minutes(self.lock_duration_minutes as i64);
        let record = LockRecord {
            lock_until: Utc::now() + duration,
            reason: reason.to_string(),
            fail_count,
        };
        let payload = serde_json::to_string(&record)
            .map_err(|e| DomainError::internal(format!("lock record serialization: {e}")))?;

        self.store
            .set_with_ttl(
                &Self::lock_key(mobile),
                &payload,
                Duration::from_secs(self.lock_duration_minutes * 60),
            )
            .await?;

        warn!(
            mobile = %mask_mobile(mobile),
            reason,
            fail_count,
            lock_minutes = self.lock_duration_minutes,
            "account locked"
        );
        Ok(())
    }

    /// Whether the account is currently locked
    pub async fn is_locked(&self, mobile: &str) -> DomainResult<bool> {
        Ok(self.store.exists(&Self::lock_key(mobile)).await?)
    }

    /// Reset the failure counter (successful login)
    pub async fn clear_failures(&self, mobile: &str) -> DomainResult<()> {
        self.store.delete(&Self::fail_key(mobile)).await?;
        Ok(())
    }

    /// Administrative unlock: removes both the lock and the counter
    ///
    /// Not called from any authentication flow.
    pub async fn unlock(&self, mobile: &str) -> DomainResult<()> {
        self.store.delete(&Self::lock_key(mobile)).await?;
        self.store.delete(&Self::fail_key(mobile)).await?;
        info!(mobile = %mask_mobile(mobile), "account unlocked by operator");
        Ok(())
    }
}
