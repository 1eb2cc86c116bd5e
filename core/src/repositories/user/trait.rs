//! User directory contract

use async_trait::async_trait;

use crate::domain::entities::Account;
use crate::errors::DomainResult;

/// Persistent account storage
///
/// The production implementation lives in `ak_infra` on top of MySQL;
/// [`super::MockUserDirectory`] backs the service tests.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_mobile(&self, mobile: &str) -> DomainResult<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<Account>>;

    async fn exists_mobile(&self, mobile: &str) -> DomainResult<bool>;

    async fn exists_username(&self, username: &str) -> DomainResult<bool>;

    /// Insert a new account and return it with its assigned id
    async fn insert(&self, account: Account) -> DomainResult<Account>;

    /// Replace the password hash for the account owning `mobile`
    async fn update_password(&self, mobile: &str, password_hash: &str) -> DomainResult<()>;

    /// Record a successful login (timestamp and client address)
    async fn update_login_metadata(&self, id: i64, client_ip: &str) -> DomainResult<()>;
}
