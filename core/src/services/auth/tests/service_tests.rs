use std::time::Duration;

use crate::domain::entities::{Account, Purpose};
use crate::errors::{AuthError, DomainError};
use crate::repositories::user::UserDirectory;
use crate::services::password::PasswordHasher;
use crate::store::EphemeralStore;

use super::mocks::TestHarness;

const MOBILE: &str = "13800138000";
const OTHER_MOBILE: &str = "13900001111";

fn assert_auth_err(result: Result<impl std::fmt::Debug, DomainError>, expected: AuthError) {
    match result {
        Err(DomainError::Auth(e)) => assert_eq!(e, expected),
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}

async fn seed_password_account(harness: &TestHarness, mobile: &str, password: &str) {
    let mut account = Account::new("alice", mobile);
    account.password_hash = Some(PasswordHasher::new().hash(password).unwrap());
    harness.directory.insert(account).await.unwrap();
}

// -- registration ---------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_full_registration_journey() {
    let harness = TestHarness::new();

    harness
        .service
        .send_register_code(MOBILE, "alice")
        .await
        .unwrap();
    let code = harness
        .dispatcher
        .last_code(MOBILE, Purpose::Register)
        .expect("code was dispatched");

    let grant = harness.service.register(MOBILE, "alice", &code).await.unwrap();
    assert!(grant.user_id > 0);
    assert_eq!(grant.username, "alice");
    assert_eq!(grant.token_type, "Bearer");
    assert_eq!(grant.need_create_avatar, Some(true));

    // The minted token verifies and names the new account
    let claims = harness.service.verify_token(&grant.token).unwrap();
    assert_eq!(claims.user_id, grant.user_id);
    assert_eq!(claims.mobile, MOBILE);

    // A session record exists for the token's lifetime
    let session = harness
        .store
        .get(&format!("session:token:{}", grant.token))
        .await
        .unwrap();
    assert!(session.is_some());

    // The code is single-use: replaying it cannot register again
    assert_auth_err(
        harness.service.register(OTHER_MOBILE, "bob", &code).await,
        AuthError::CodeExpired,
    );
}

#[tokio::test(start_paused = true)]
async fn test_send_register_code_validates_before_spending_quota() {
    let harness = TestHarness::new();

    assert_auth_err(
        harness.service.send_register_code("12345", "alice").await,
        AuthError::InvalidMobileFormat,
    );
    assert_auth_err(
        harness.service.send_register_code(MOBILE, "a").await,
        AuthError::InvalidUsernameFormat,
    );
    assert_eq!(harness.dispatcher.sent_count(), 0);

    // The rejected attempts burned no cooldown
    harness
        .service
        .send_register_code(MOBILE, "alice")
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_send_register_code_rejects_taken_identities() {
    let harness = TestHarness::new();
    harness
        .directory
        .insert(Account::new("alice", MOBILE))
        .await
        .unwrap();

    assert_auth_err(
        harness.service.send_register_code(MOBILE, "bob").await,
        AuthError::MobileAlreadyRegistered,
    );
    assert_auth_err(
        harness
            .service
            .send_register_code(OTHER_MOBILE, "alice")
            .await,
        AuthError::UsernameAlreadyExists,
    );
}

#[tokio::test(start_paused = true)]
async fn test_register_with_wrong_code_burns_it() {
    let harness = TestHarness::new();
    harness
        .service
        .send_register_code(MOBILE, "alice")
        .await
        .unwrap();
    let code = harness
        .dispatcher
        .last_code(MOBILE, Purpose::Register)
        .unwrap();

    assert_auth_err(
        harness.service.register(MOBILE, "alice", "000000").await,
        AuthError::InvalidCode,
    );
    // The right code no longer works either
    assert_auth_err(
        harness.service.register(MOBILE, "alice", &code).await,
        AuthError::CodeExpired,
    );
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_failure_does_not_fail_the_send() {
    let harness = TestHarness::new();
    harness.dispatcher.fail_deliveries();

    harness
        .service
        .send_register_code(MOBILE, "alice")
        .await
        .unwrap();
    assert_eq!(harness.dispatcher.sent_count(), 1);
}

// -- password login -------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_login_by_password_success_clears_failures() {
    let harness = TestHarness::new();
    seed_password_account(&harness, MOBILE, "secret123").await;

    // Two failures, then success
    for _ in 0..2 {
        assert_auth_err(
            harness
                .service
                .login_by_password(MOBILE, "wrong", false, "10.0.0.1")
                .await,
            AuthError::InvalidCredentials,
        );
    }

    let grant = harness
        .service
        .login_by_password(MOBILE, "secret123", false, "10.0.0.1")
        .await
        .unwrap();
    assert_eq!(grant.avatar_created, Some(false));

    // Counter was reset, so five more failures are needed to lock
    assert!(harness
        .store
        .get(&format!("login:fail:count:{MOBILE}"))
        .await
        .unwrap()
        .is_none());

    // Login metadata was recorded
    let account = harness
        .directory
        .find_by_mobile(MOBILE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.last_login_ip.as_deref(), Some("10.0.0.1"));
}

#[tokio::test(start_paused = true)]
async fn test_five_failures_lock_the_account() {
    let harness = TestHarness::new();
    seed_password_account(&harness, OTHER_MOBILE, "secret123").await;

    for _ in 0..5 {
        assert_auth_err(
            harness
                .service
                .login_by_password(OTHER_MOBILE, "wrong", false, "10.0.0.1")
                .await,
            AuthError::InvalidCredentials,
        );
    }

    // Even the correct password is refused while locked
    assert_auth_err(
        harness
            .service
            .login_by_password(OTHER_MOBILE, "secret123", false, "10.0.0.1")
            .await,
        AuthError::AccountLocked { minutes: 30 },
    );
}

#[tokio::test(start_paused = true)]
async fn test_lock_expires_after_policy_duration() {
    let harness = TestHarness::new();
    seed_password_account(&harness, MOBILE, "secret123").await;

    for _ in 0..5 {
        let _ = harness
            .service
            .login_by_password(MOBILE, "wrong", false, "10.0.0.1")
            .await;
    }

    tokio::time::advance(Duration::from_secs(30 * 60)).await;

    // Failure counter (60 min window) may still be live, but the lock
    // itself has expired, and a correct login resets everything
    harness
        .service
        .login_by_password(MOBILE, "secret123", false, "10.0.0.1")
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unknown_mobile_counts_toward_lockout() {
    let harness = TestHarness::new();

    for _ in 0..3 {
        assert_auth_err(
            harness
                .service
                .login_by_password(MOBILE, "whatever", false, "10.0.0.1")
                .await,
            AuthError::MobileNotRegistered,
        );
    }

    let count = harness
        .store
        .get(&format!("login:fail:count:{MOBILE}"))
        .await
        .unwrap();
    assert_eq!(count.as_deref(), Some("3"));
}

#[tokio::test(start_paused = true)]
async fn test_account_without_password_cannot_password_login() {
    let harness = TestHarness::new();
    harness
        .directory
        .insert(Account::new("alice", MOBILE))
        .await
        .unwrap();

    assert_auth_err(
        harness
            .service
            .login_by_password(MOBILE, "anything", false, "10.0.0.1")
            .await,
        AuthError::InvalidCredentials,
    );
}

#[tokio::test(start_paused = true)]
async fn test_remember_me_grants_longer_expiry() {
    let harness = TestHarness::new();
    seed_password_account(&harness, MOBILE, "secret123").await;

    let short = harness
        .service
        .login_by_password(MOBILE, "secret123", false, "10.0.0.1")
        .await
        .unwrap();
    let long = harness
        .service
        .login_by_password(MOBILE, "secret123", true, "10.0.0.1")
        .await
        .unwrap();
    assert!(long.expires_in > short.expires_in);
}

// -- sms login ------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_sms_login_journey() {
    let harness = TestHarness::new();
    harness
        .directory
        .insert(Account::new("alice", MOBILE))
        .await
        .unwrap();

    harness.service.send_login_code(MOBILE).await.unwrap();
    let code = harness.dispatcher.last_code(MOBILE, Purpose::Login).unwrap();

    let grant = harness
        .service
        .login_by_sms(MOBILE, &code, "10.0.0.2")
        .await
        .unwrap();
    assert_eq!(grant.mobile, MOBILE);

    // Single use
    assert_auth_err(
        harness.service.login_by_sms(MOBILE, &code, "10.0.0.2").await,
        AuthError::CodeExpired,
    );
}

#[tokio::test(start_paused = true)]
async fn test_send_login_code_requires_registration() {
    let harness = TestHarness::new();
    assert_auth_err(
        harness.service.send_login_code(MOBILE).await,
        AuthError::MobileNotRegistered,
    );
}

#[tokio::test(start_paused = true)]
async fn test_sms_login_blocked_while_locked() {
    let harness = TestHarness::new();
    seed_password_account(&harness, MOBILE, "secret123").await;

    harness.service.send_login_code(MOBILE).await.unwrap();
    let code = harness.dispatcher.last_code(MOBILE, Purpose::Login).unwrap();

    for _ in 0..5 {
        let _ = harness
            .service
            .login_by_password(MOBILE, "wrong", false, "10.0.0.1")
            .await;
    }

    assert_auth_err(
        harness.service.login_by_sms(MOBILE, &code, "10.0.0.1").await,
        AuthError::AccountLocked { minutes: 30 },
    );
}

#[tokio::test(start_paused = true)]
async fn test_register_code_cannot_log_in() {
    let harness = TestHarness::new();
    harness
        .directory
        .insert(Account::new("alice", MOBILE))
        .await
        .unwrap();

    // Codes are namespaced per purpose; a reset code is useless for login
    harness.service.send_reset_code(MOBILE).await.unwrap();
    let code = harness
        .dispatcher
        .last_code(MOBILE, Purpose::ResetPassword)
        .unwrap();

    assert_auth_err(
        harness.service.login_by_sms(MOBILE, &code, "10.0.0.1").await,
        AuthError::CodeExpired,
    );
}

// -- password reset -------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_reset_password_journey() {
    let harness = TestHarness::new();
    seed_password_account(&harness, MOBILE, "oldpass1").await;

    harness.service.send_reset_code(MOBILE).await.unwrap();
    let code = harness
        .dispatcher
        .last_code(MOBILE, Purpose::ResetPassword)
        .unwrap();

    harness
        .service
        .reset_password(MOBILE, &code, "newpass1", "newpass1")
        .await
        .unwrap();

    // Old password refused, new one accepted
    assert_auth_err(
        harness
            .service
            .login_by_password(MOBILE, "oldpass1", false, "10.0.0.1")
            .await,
        AuthError::InvalidCredentials,
    );
    harness
        .service
        .login_by_password(MOBILE, "newpass1", false, "10.0.0.1")
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_reset_burns_code_before_checking_password_shape() {
    let harness = TestHarness::new();
    seed_password_account(&harness, MOBILE, "oldpass1").await;

    harness.service.send_reset_code(MOBILE).await.unwrap();
    let code = harness
        .dispatcher
        .last_code(MOBILE, Purpose::ResetPassword)
        .unwrap();

    // Too-short password rejected, but the code is already spent
    assert_auth_err(
        harness
            .service
            .reset_password(MOBILE, &code, "x", "x")
            .await,
        AuthError::InvalidPasswordFormat,
    );
    assert_auth_err(
        harness
            .service
            .reset_password(MOBILE, &code, "validpass1", "validpass1")
            .await,
        AuthError::CodeExpired,
    );
}

#[tokio::test(start_paused = true)]
async fn test_reset_rejects_mismatched_confirmation() {
    let harness = TestHarness::new();
    seed_password_account(&harness, MOBILE, "oldpass1").await;

    harness.service.send_reset_code(MOBILE).await.unwrap();
    let code = harness
        .dispatcher
        .last_code(MOBILE, Purpose::ResetPassword)
        .unwrap();

    assert_auth_err(
        harness
            .service
            .reset_password(MOBILE, &code, "newpass1", "newpass2")
            .await,
        AuthError::PasswordMismatch,
    );
}

#[tokio::test(start_paused = true)]
async fn test_send_reset_code_requires_registration() {
    let harness = TestHarness::new();
    assert_auth_err(
        harness.service.send_reset_code(MOBILE).await,
        AuthError::MobileNotRegistered,
    );
}

// -- rate limiting through the flows --------------------------------------

#[tokio::test(start_paused = true)]
async fn test_resend_cooldown_applies_across_purposes() {
    let harness = TestHarness::new();
    harness
        .directory
        .insert(Account::new("alice", MOBILE))
        .await
        .unwrap();

    harness.service.send_login_code(MOBILE).await.unwrap();
    assert_auth_err(
        harness.service.send_reset_code(MOBILE).await,
        AuthError::RequestTooFrequent { seconds: 60 },
    );

    tokio::time::advance(Duration::from_secs(60)).await;
    harness.service.send_reset_code(MOBILE).await.unwrap();
}

// -- username availability ------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_check_username_reports_availability() {
    let harness = TestHarness::new();
    let free = harness.service.check_username("alice").await.unwrap();
    assert!(free.available);
    assert!(free.suggestions.is_none());

    harness
        .directory
        .insert(Account::new("alice", MOBILE))
        .await
        .unwrap();
    let taken = harness.service.check_username("alice").await.unwrap();
    assert!(!taken.available);
    let suggestions = taken.suggestions.unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions.iter().all(|s| s.starts_with("alice")));
}

#[tokio::test(start_paused = true)]
async fn test_check_username_rejects_bad_format() {
    let harness = TestHarness::new();
    assert_auth_err(
        harness.service.check_username("a!").await,
        AuthError::InvalidUsernameFormat,
    );
}
