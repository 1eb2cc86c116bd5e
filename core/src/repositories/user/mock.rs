//! In-memory user directory for tests and local development

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::entities::Account;
use crate::errors::{DomainError, DomainResult};

use super::UserDirectory;

/// Mutex-guarded vector of accounts with sequential id assignment
#[derive(Debug, Default)]
pub struct MockUserDirectory {
    accounts: Mutex<Vec<Account>>,
    next_id: AtomicI64,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed the directory with an existing account, assigning it an id
    pub fn with_account(self, account: Account) -> Self {
        let mut seeded = account;
        seeded.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(seeded);
        self
    }

    fn lock(&self) -> DomainResult<std::sync::MutexGuard<'_, Vec<Account>>> {
        self.accounts
            .lock()
            .map_err(|_| DomainError::internal("mock directory mutex poisoned"))
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn find_by_mobile(&self, mobile: &str) -> DomainResult<Option<Account>> {
        Ok(self.lock()?.iter().find(|a| a.mobile == mobile).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<Account>> {
        Ok(self
            .lock()?
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn exists_mobile(&self, mobile: &str) -> DomainResult<bool> {
        Ok(self.lock()?.iter().any(|a| a.mobile == mobile))
    }

    async fn exists_username(&self, username: &str) -> DomainResult<bool> {
        Ok(self.lock()?.iter().any(|a| a.username == username))
    }

    async fn insert(&self, account: Account) -> DomainResult<Account> {
        let mut accounts = self.lock()?;
        if accounts.iter().any(|a| a.mobile == account.mobile) {
            return Err(DomainError::internal("duplicate mobile on insert"));
        }
        let mut inserted = account;
        inserted.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        accounts.push(inserted.clone());
        Ok(inserted)
    }

    async fn update_password(&self, mobile: &str, password_hash: &str) -> DomainResult<()> {
        let mut accounts = self.lock()?;
        match accounts.iter_mut().find(|a| a.mobile == mobile) {
            Some(account) => {
                account.password_hash = Some(password_hash.to_string());
                account.updated_at = Utc::now();
                Ok(())
            }
            None => Err(DomainError::internal("no account for mobile")),
        }
    }

    async fn update_login_metadata(&self, id: i64, client_ip: &str) -> DomainResult<()> {
        let mut accounts = self.lock()?;
        match accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.last_login_at = Some(Utc::now());
                account.last_login_ip = Some(client_ip.to_string());
                Ok(())
            }
            None => Err(DomainError::internal("no account for id")),
        }
    }
}
