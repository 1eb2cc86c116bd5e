//! Authentication orchestrator
//!
//! Single entry point for the credential flows. Each flow runs its
//! guards in a fixed order, then performs at most one write against the
//! user directory; all short-lived state (codes, cooldowns, failure
//! counters, locks, sessions) lives in the ephemeral store.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use ak_shared::config::AuthPolicy;
use ak_shared::utils::mobile::mask_mobile;
use ak_shared::utils::validation::CredentialValidator;

use crate::domain::entities::{Account, Claims, Purpose};
use crate::domain::value_objects::{CheckUsername, TokenGrant};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::UserDirectory;
use crate::services::dispatch::CodeDispatcher;
use crate::services::password::PasswordHasher;
use crate::services::token::{MintedToken, TokenService};
use crate::services::verification::{CodeLedger, ConsumeOutcome};
use crate::store::EphemeralStore;

use super::lockout::LockoutTracker;
use super::rate_limiter::{AcquireOutcome, RateLimiter};

/// Session record stored at `session:token:{token}` for the token's
/// lifetime
#[derive(Debug, Serialize)]
struct SessionRecord<'a> {
    user_id: i64,
    username: &'a str,
    mobile: &'a str,
}

enum GrantKind {
    Registration,
    Login,
}

/// Orchestrates registration, login and password reset
pub struct AuthService<S, U, D>
where
    S: EphemeralStore,
    U: UserDirectory,
    D: CodeDispatcher,
{
    store: Arc<S>,
    directory: Arc<U>,
    dispatcher: Arc<D>,
    tokens: TokenService,
    ledger: CodeLedger<S>,
    rate_limiter: RateLimiter<S>,
    lockout: LockoutTracker<S>,
    hasher: PasswordHasher,
    validator: CredentialValidator,
}

impl<S, U, D> AuthService<S, U, D>
where
    S: EphemeralStore,
    U: UserDirectory,
    D: CodeDispatcher,
{
    pub fn new(
        store: Arc<S>,
        directory: Arc<U>,
        dispatcher: Arc<D>,
        policy: &AuthPolicy,
    ) -> DomainResult<Self> {
        let validator = CredentialValidator::new(&policy.rules)
            .map_err(|e| DomainError::internal(format!("credential pattern rejected: {e}")))?;

        Ok(Self {
            tokens: TokenService::new(&policy.token),
            ledger: CodeLedger::new(Arc::clone(&store), &policy.sms),
            rate_limiter: RateLimiter::new(Arc::clone(&store), &policy.sms),
            lockout: LockoutTracker::new(Arc::clone(&store), &policy.login),
            hasher: PasswordHasher::new(),
            validator,
            store,
            directory,
            dispatcher,
        })
    }

    /// Send a registration code to an unregistered mobile
    ///
    /// Validates formats and availability before spending any rate-limit
    /// quota, so a rejected request never burns the caller's cooldown.
    pub async fn send_register_code(&self, mobile: &str, username: &str) -> DomainResult<()> {
        if !self.validator.is_valid_mobile(mobile) {
            return Err(AuthError::InvalidMobileFormat.into());
        }
        if !self.validator.is_valid_username(username) {
            return Err(AuthError::InvalidUsernameFormat.into());
        }
        if self.directory.exists_mobile(mobile).await? {
            return Err(AuthError::MobileAlreadyRegistered.into());
        }
        if self.directory.exists_username(username).await? {
            return Err(AuthError::UsernameAlreadyExists.into());
        }

        self.acquire_send_slot(mobile).await?;
        self.issue_and_dispatch(mobile, Purpose::Register).await?;

        info!(
            mobile = %mask_mobile(mobile),
            username,
            purpose = "register",
            "verification code requested"
        );
        Ok(())
    }

    /// Complete registration with the code from [`Self::send_register_code`]
    pub async fn register(
        &self,
        mobile: &str,
        username: &str,
        code: &str,
    ) -> DomainResult<TokenGrant> {
        match self.ledger.consume(mobile, Purpose::Register, code).await? {
            ConsumeOutcome::Matched => {}
            ConsumeOutcome::Expired => return Err(AuthError::CodeExpired.into()),
            ConsumeOutcome::Mismatch => {
                warn!(mobile = %mask_mobile(mobile), "registration code mismatch");
                return Err(AuthError::InvalidCode.into());
            }
        }

        let account = self.directory.insert(Account::new(username, mobile)).await?;
        let grant = self
            .grant_token(&account, self.tokens.register_expiry(), GrantKind::Registration)
            .await?;

        info!(
            user_id = account.id,
            username = %account.username,
            mobile = %mask_mobile(mobile),
            "account registered"
        );
        Ok(grant)
    }

    /// Log in with mobile and password
    pub async fn login_by_password(
        &self,
        mobile: &str,
        password: &str,
        remember_me: bool,
        client_ip: &str,
    ) -> DomainResult<TokenGrant> {
        let Some(account) = self.directory.find_by_mobile(mobile).await? else {
            // Unknown mobiles still feed the failure counter, otherwise
            // the counter is trivially avoided by mistyping the number
            self.note_login_failure(mobile).await?;
            return Err(AuthError::MobileNotRegistered.into());
        };

        self.ensure_not_locked(mobile).await?;

        let verified = account
            .password_hash
            .as_deref()
            .map(|stored| self.hasher.verify(password, stored))
            .unwrap_or(false);
        if !verified {
            self.note_login_failure(mobile).await?;
            return Err(AuthError::InvalidCredentials.into());
        }

        self.lockout.clear_failures(mobile).await?;
        self.directory
            .update_login_metadata(account.id, client_ip)
            .await?;

        let expires_in = self.tokens.login_expiry(remember_me);
        let grant = self.grant_token(&account, expires_in, GrantKind::Login).await?;

        info!(
            user_id = account.id,
            mobile = %mask_mobile(mobile),
            login_type = "password",
            remember_me,
            "login succeeded"
        );
        Ok(grant)
    }

    /// Log in with mobile and a previously sent login code
    pub async fn login_by_sms(
        &self,
        mobile: &str,
        code: &str,
        client_ip: &str,
    ) -> DomainResult<TokenGrant> {
        let Some(account) = self.directory.find_by_mobile(mobile).await? else {
            return Err(AuthError::MobileNotRegistered.into());
        };

        self.ensure_not_locked(mobile).await?;

        match self.ledger.consume(mobile, Purpose::Login, code).await? {
            ConsumeOutcome::Matched => {}
            ConsumeOutcome::Expired => return Err(AuthError::CodeExpired.into()),
            ConsumeOutcome::Mismatch => {
                warn!(mobile = %mask_mobile(mobile), "login code mismatch");
                return Err(AuthError::InvalidCode.into());
            }
        }

        self.directory
            .update_login_metadata(account.id, client_ip)
            .await?;

        let grant = self
            .grant_token(&account, self.tokens.login_expiry(false), GrantKind::Login)
            .await?;

        info!(
            user_id = account.id,
            mobile = %mask_mobile(mobile),
            login_type = "sms",
            "login succeeded"
        );
        Ok(grant)
    }

    /// Send a login code to a registered mobile
    pub async fn send_login_code(&self, mobile: &str) -> DomainResult<()> {
        if !self.directory.exists_mobile(mobile).await? {
            return Err(AuthError::MobileNotRegistered.into());
        }
        self.acquire_send_slot(mobile).await?;
        self.issue_and_dispatch(mobile, Purpose::Login).await?;

        info!(
            mobile = %mask_mobile(mobile),
            purpose = "login",
            "verification code requested"
        );
        Ok(())
    }

    /// Send a password-reset code to a registered mobile
    pub async fn send_reset_code(&self, mobile: &str) -> DomainResult<()> {
        if !self.directory.exists_mobile(mobile).await? {
            return Err(AuthError::MobileNotRegistered.into());
        }
        self.acquire_send_slot(mobile).await?;
        self.issue_and_dispatch(mobile, Purpose::ResetPassword).await?;

        info!(
            mobile = %mask_mobile(mobile),
            purpose = "reset_password",
            "verification code requested"
        );
        Ok(())
    }

    /// Reset the password with the code from [`Self::send_reset_code`]
    ///
    /// The code is consumed before the new password is inspected, so a
    /// rejected password still spends the code.
    pub async fn reset_password(
        &self,
        mobile: &str,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> DomainResult<()> {
        if !self.directory.exists_mobile(mobile).await? {
            return Err(AuthError::MobileNotRegistered.into());
        }

        match self
            .ledger
            .consume(mobile, Purpose::ResetPassword, code)
            .await?
        {
            ConsumeOutcome::Matched => {}
            ConsumeOutcome::Expired => return Err(AuthError::CodeExpired.into()),
            ConsumeOutcome::Mismatch => {
                warn!(mobile = %mask_mobile(mobile), "reset code mismatch");
                return Err(AuthError::InvalidCode.into());
            }
        }

        if !self.validator.is_valid_password(new_password) {
            return Err(AuthError::InvalidPasswordFormat.into());
        }
        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch.into());
        }

        let hash = self.hasher.hash(new_password)?;
        self.directory.update_password(mobile, &hash).await?;
        self.lockout.clear_failures(mobile).await?;

        info!(mobile = %mask_mobile(mobile), "password reset");
        Ok(())
    }

    /// Check whether a username is free, offering alternatives if not
    pub async fn check_username(&self, username: &str) -> DomainResult<CheckUsername> {
        if !self.validator.is_valid_username(username) {
            return Err(AuthError::InvalidUsernameFormat.into());
        }
        if !self.directory.exists_username(username).await? {
            return Ok(CheckUsername::available());
        }

        let mut suggestions = Vec::new();
        for suffix in 1..=9 {
            let candidate = format!("{username}{suffix}");
            if self.validator.is_valid_username(&candidate)
                && !self.directory.exists_username(&candidate).await?
            {
                suggestions.push(candidate);
                if suggestions.len() == 3 {
                    break;
                }
            }
        }
        Ok(CheckUsername::taken(suggestions))
    }

    /// Verify an access token presented by the transport layer
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.tokens.verify(token)
    }

    async fn acquire_send_slot(&self, mobile: &str) -> DomainResult<()> {
        match self.rate_limiter.try_acquire(mobile).await? {
            AcquireOutcome::Allowed => Ok(()),
            AcquireOutcome::Throttled {
                retry_after_seconds,
            } => {
                warn!(
                    mobile = %mask_mobile(mobile),
                    retry_after_seconds,
                    "send throttled"
                );
                Err(AuthError::RequestTooFrequent {
                    seconds: retry_after_seconds,
                }
                .into())
            }
        }
    }

    async fn issue_and_dispatch(&self, mobile: &str, purpose: Purpose) -> DomainResult<()> {
        let issued = self.ledger.issue(mobile, purpose).await?;

        // Delivery is fire-and-forget: vendor failures are logged, never
        // surfaced, so error responses cannot probe the SMS channel
        if let Err(e) = self
            .dispatcher
            .dispatch(mobile, purpose, &issued.code)
            .await
        {
            warn!(
                mobile = %mask_mobile(mobile),
                %purpose,
                error = %e,
                "code dispatch failed"
            );
        }
        Ok(())
    }

    async fn ensure_not_locked(&self, mobile: &str) -> DomainResult<()> {
        if self.lockout.is_locked(mobile).await? {
            return Err(AuthError::AccountLocked {
                minutes: self.lockout.lock_duration_minutes(),
            }
            .into());
        }
        Ok(())
    }

    async fn note_login_failure(&self, mobile: &str) -> DomainResult<()> {
        let count = self.lockout.record_failure(mobile).await?;
        if count >= self.lockout.max_fail_attempts() {
            self.lockout
                .lock(mobile, "password_failures_exceeded", count)
                .await?;
        }
        Ok(())
    }

    async fn grant_token(
        &self,
        account: &Account,
        expires_in: i64,
        kind: GrantKind,
    ) -> DomainResult<TokenGrant> {
        let minted = self
            .tokens
            .mint(account.id, &account.username, &account.mobile, expires_in)?;
        self.persist_session(account, &minted).await?;

        Ok(match kind {
            GrantKind::Registration => {
                TokenGrant::for_registration(account, minted.token, minted.expires_in)
            }
            GrantKind::Login => TokenGrant::for_login(account, minted.token, minted.expires_in),
        })
    }

    async fn persist_session(&self, account: &Account, minted: &MintedToken) -> DomainResult<()> {
        let record = SessionRecord {
            user_id: account.id,
            username: &account.username,
            mobile: &account.mobile,
        };
        let payload = serde_json::to_string(&record)
            .map_err(|e| DomainError::internal(format!("session serialization: {e}")))?;

        self.store
            .set_with_ttl(
                &format!("session:token:{}", minted.token),
                &payload,
                Duration::from_secs(minted.expires_in.max(0) as u64),
            )
            .await?;
        Ok(())
    }
}
