//! End-to-end flow tests over the public crate surface

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use ak_core::repositories::user::MockUserDirectory;
use ak_core::services::dispatch::{CodeDispatcher, DispatchError};
use ak_core::{AuthError, AuthService, DomainError, InMemoryStore, Purpose};
use ak_shared::config::AuthPolicy;

/// Captures dispatched codes so tests can read them back
#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<(String, Purpose, String)>>,
}

impl Outbox {
    fn last_code(&self, mobile: &str, purpose: Purpose) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, p, _)| m == mobile && *p == purpose)
            .map(|(_, _, code)| code.clone())
    }
}

#[async_trait]
impl CodeDispatcher for Outbox {
    async fn dispatch(
        &self,
        mobile: &str,
        purpose: Purpose,
        code: &str,
    ) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .unwrap()
            .push((mobile.to_string(), purpose, code.to_string()));
        Ok(())
    }
}

struct App {
    service: AuthService<InMemoryStore, MockUserDirectory, Outbox>,
    outbox: Arc<Outbox>,
}

fn app() -> App {
    let store = Arc::new(InMemoryStore::new());
    let directory = Arc::new(MockUserDirectory::new());
    let outbox = Arc::new(Outbox::default());
    let service = AuthService::new(
        store,
        directory,
        Arc::clone(&outbox),
        &AuthPolicy::default(),
    )
    .unwrap();
    App { service, outbox }
}

fn expect_auth_err(result: Result<impl std::fmt::Debug, DomainError>) -> AuthError {
    match result {
        Err(DomainError::Auth(e)) => e,
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn register_login_and_reset_round_trip() {
    let app = app();
    let mobile = "13800138000";

    // Register
    app.service
        .send_register_code(mobile, "alice")
        .await
        .unwrap();
    let code = app.outbox.last_code(mobile, Purpose::Register).unwrap();
    let grant = app.service.register(mobile, "alice", &code).await.unwrap();
    assert_eq!(grant.need_create_avatar, Some(true));

    let claims = app.service.verify_token(&grant.token).unwrap();
    assert_eq!(claims.username, "alice");

    // No password yet: set one through the reset flow
    tokio::time::advance(Duration::from_secs(60)).await;
    app.service.send_reset_code(mobile).await.unwrap();
    let code = app
        .outbox
        .last_code(mobile, Purpose::ResetPassword)
        .unwrap();
    app.service
        .reset_password(mobile, &code, "secret123", "secret123")
        .await
        .unwrap();

    // Password login now works
    let grant = app
        .service
        .login_by_password(mobile, "secret123", false, "203.0.113.9")
        .await
        .unwrap();
    assert_eq!(grant.avatar_created, Some(false));
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_lock_until_the_window_passes() {
    let app = app();
    let mobile = "13900001111";

    app.service
        .send_register_code(mobile, "bob")
        .await
        .unwrap();
    let code = app.outbox.last_code(mobile, Purpose::Register).unwrap();
    app.service.register(mobile, "bob", &code).await.unwrap();

    tokio::time::advance(Duration::from_secs(60)).await;
    app.service.send_reset_code(mobile).await.unwrap();
    let code = app
        .outbox
        .last_code(mobile, Purpose::ResetPassword)
        .unwrap();
    app.service
        .reset_password(mobile, &code, "secret123", "secret123")
        .await
        .unwrap();

    for _ in 0..5 {
        let err = expect_auth_err(
            app.service
                .login_by_password(mobile, "wrong-password", false, "203.0.113.9")
                .await,
        );
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    // Correct password is refused while the lock holds
    let err = expect_auth_err(
        app.service
            .login_by_password(mobile, "secret123", false, "203.0.113.9")
            .await,
    );
    assert!(matches!(err, AuthError::AccountLocked { .. }));

    // After the lock and failure window expire, login succeeds again
    tokio::time::advance(Duration::from_secs(60 * 60)).await;
    app.service
        .login_by_password(mobile, "secret123", false, "203.0.113.9")
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn a_code_can_only_be_spent_once_anywhere() {
    let app = app();
    let mobile = "13800138000";

    app.service
        .send_register_code(mobile, "alice")
        .await
        .unwrap();
    let code = app.outbox.last_code(mobile, Purpose::Register).unwrap();

    // A wrong guess burns the real code
    let wrong = if code == "999999" { "999998" } else { "999999" };
    let err = expect_auth_err(app.service.register(mobile, "alice", wrong).await);
    assert_eq!(err, AuthError::InvalidCode);
    let err = expect_auth_err(app.service.register(mobile, "alice", &code).await);
    assert_eq!(err, AuthError::CodeExpired);
}
