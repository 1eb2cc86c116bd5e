//! Verification code issue and consume
//!
//! One live code per `(mobile, purpose)` pair, stored at
//! `sms:code:{mobile}:{purpose}` with the policy TTL. Reissuing replaces
//! the previous code. Consuming always burns the stored code before the
//! comparison, so a wrong guess spends the code too.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::{debug, info};

use ak_shared::config::SmsCodePolicy;
use ak_shared::utils::mobile::mask_mobile;

use crate::domain::entities::{Purpose, VerificationCode};
use crate::errors::{DomainError, DomainResult};
use crate::store::EphemeralStore;

/// Outcome of presenting a code candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Candidate matched; the code is spent
    Matched,
    /// No live code for this mobile and purpose
    Expired,
    /// A live code existed but did not match; it is spent anyway
    Mismatch,
}

/// Issues and consumes verification codes against the ephemeral store
pub struct CodeLedger<S: EphemeralStore> {
    store: Arc<S>,
    code_length: usize,
    expire_seconds: u64,
}

impl<S: EphemeralStore> CodeLedger<S> {
    pub fn new(store: Arc<S>, policy: &SmsCodePolicy) -> Self {
        Self {
            store,
            code_length: policy.code_length,
            expire_seconds: policy.expire_seconds,
        }
    }

    fn key(mobile: &str, purpose: Purpose) -> String {
        format!("sms:code:{}:{}", mobile, purpose.as_str())
    }

    /// Issue a fresh code, replacing any live one for the same pair
    pub async fn issue(&self, mobile: &str, purpose: Purpose) -> DomainResult<VerificationCode> {
        let code = self.generate_code()?;
        let now = Utc::now();

        self.store
            .set_with_ttl(
                &Self::key(mobile, purpose),
                &code,
                Duration::from_secs(self.expire_seconds),
            )
            .await?;

        info!(
            mobile = %mask_mobile(mobile),
            %purpose,
            ttl_seconds = self.expire_seconds,
            "verification code issued"
        );

        Ok(VerificationCode {
            code,
            issued_at: now,
            expires_at: now + ChronoDuration::seconds(self.expire_seconds as i64),
        })
    }

    /// Present a candidate against the stored code
    ///
    /// The stored code is deleted before the comparison; no outcome
    /// leaves it usable.
    pub async fn consume(
        &self,
        mobile: &str,
        purpose: Purpose,
        candidate: &str,
    ) -> DomainResult<ConsumeOutcome> {
        let key = Self::key(mobile, purpose);
        let Some(stored) = self.store.get(&key).await? else {
            debug!(mobile = %mask_mobile(mobile), %purpose, "no live code to consume");
            return Ok(ConsumeOutcome::Expired);
        };

        self.store.delete(&key).await?;

        let matched = stored.len() == candidate.len()
            && constant_time_eq(stored.as_bytes(), candidate.as_bytes());
        if matched {
            Ok(ConsumeOutcome::Matched)
        } else {
            Ok(ConsumeOutcome::Mismatch)
        }
    }

    fn generate_code(&self) -> DomainResult<String> {
        if self.code_length == 0 {
            return Err(DomainError::internal("code length must be positive"));
        }
        let mut rng = OsRng;
        let mut code = String::with_capacity(self.code_length);
        for _ in 0..self.code_length {
            code.push(char::from(b'0' + rng.gen_range(0..10u8)));
        }
        Ok(code)
    }
}
