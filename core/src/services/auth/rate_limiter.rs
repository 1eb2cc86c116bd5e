//! Send-side rate limiting for verification codes
//!
//! Two guards per mobile: a short cooldown between consecutive sends and
//! a rolling daily cap. The cooldown is claimed with an atomic
//! set-if-absent, so concurrent requests cannot both win; the daily
//! counter only moves for requests that won the cooldown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use ak_shared::config::SmsCodePolicy;
use ak_shared::utils::mobile::mask_mobile;

use crate::errors::DomainResult;
use crate::store::EphemeralStore;

const DAILY_WINDOW_SECONDS: u64 = 86_400;

/// Outcome of asking for a send slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Allowed,
    Throttled { retry_after_seconds: u64 },
}

/// Per-mobile send throttle
pub struct RateLimiter<S: EphemeralStore> {
    store: Arc<S>,
    cooldown_seconds: u64,
    daily_limit: i64,
}

impl<S: EphemeralStore> RateLimiter<S> {
    pub fn new(store: Arc<S>, policy: &SmsCodePolicy) -> Self {
        Self {
            store,
            cooldown_seconds: policy.resend_cooldown_seconds,
            daily_limit: policy.daily_limit,
        }
    }

    fn cooldown_key(mobile: &str) -> String {
        format!("sms:rate:limit:{mobile}")
    }

    fn daily_key(mobile: &str) -> String {
        format!("sms:rate:daily:{mobile}")
    }

    /// Try to claim a send slot for `mobile`
    pub async fn try_acquire(&self, mobile: &str) -> DomainResult<AcquireOutcome> {
        let claimed = self
            .store
            .set_if_absent_with_ttl(
                &Self::cooldown_key(mobile),
                &Utc::now().timestamp_millis().to_string(),
                Duration::from_secs(self.cooldown_seconds),
            )
            .await?;
        if !claimed {
            return Ok(AcquireOutcome::Throttled {
                retry_after_seconds: self.cooldown_seconds,
            });
        }

        // Only cooldown winners consume daily quota
        let daily_key = Self::daily_key(mobile);
        let sends_today = self.store.increment(&daily_key).await?;
        if sends_today == 1 {
            self.store
                .expire(&daily_key, Duration::from_secs(DAILY_WINDOW_SECONDS))
                .await?;
        }

        if sends_today > self.daily_limit {
            // The window runs from the first send, so the wait is
            // whatever is left of the counter's TTL
            let retry_after_seconds = match self.store.ttl(&daily_key).await? {
                Some(remaining) => remaining.as_secs().max(1),
                None => DAILY_WINDOW_SECONDS,
            };
            warn!(
                mobile = %mask_mobile(mobile),
                sends_today,
                limit = self.daily_limit,
                retry_after_seconds,
                "daily send cap exceeded"
            );
            return Ok(AcquireOutcome::Throttled { retry_after_seconds });
        }

        Ok(AcquireOutcome::Allowed)
    }
}
