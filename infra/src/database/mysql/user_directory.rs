//! MySQL implementation of the user directory
//!
//! Persists accounts in the `accounts` table. Existence checks use
//! `SELECT 1 ... LIMIT 1` rather than `COUNT(*)` so they stop at the
//! first hit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use ak_core::domain::entities::{Account, AccountStatus};
use ak_core::errors::{DomainError, DomainResult};
use ak_core::repositories::UserDirectory;

/// MySQL-backed [`UserDirectory`]
pub struct MySqlUserDirectory {
    pool: MySqlPool,
}

const SELECT_COLUMNS: &str = "id, username, mobile, password_hash, avatar_config, \
     status, last_login_at, last_login_ip, created_at, updated_at";

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &sqlx::mysql::MySqlRow) -> DomainResult<Account> {
        let status_code: i16 = row
            .try_get("status")
            .map_err(|e| DomainError::internal(format!("status column: {e}")))?;
        let status = AccountStatus::from_i16(status_code)
            .ok_or_else(|| DomainError::internal(format!("unknown status code {status_code}")))?;

        Ok(Account {
            id: row
                .try_get("id")
                .map_err(|e| DomainError::internal(format!("id column: {e}")))?,
            username: row
                .try_get("username")
                .map_err(|e| DomainError::internal(format!("username column: {e}")))?,
            mobile: row
                .try_get("mobile")
                .map_err(|e| DomainError::internal(format!("mobile column: {e}")))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|e| DomainError::internal(format!("password_hash column: {e}")))?,
            avatar_config: row
                .try_get("avatar_config")
                .map_err(|e| DomainError::internal(format!("avatar_config column: {e}")))?,
            status,
            last_login_at: row
                .try_get::<Option<DateTime<Utc>>, _>("last_login_at")
                .map_err(|e| DomainError::internal(format!("last_login_at column: {e}")))?,
            last_login_ip: row
                .try_get("last_login_ip")
                .map_err(|e| DomainError::internal(format!("last_login_ip column: {e}")))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::internal(format!("created_at column: {e}")))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| DomainError::internal(format!("updated_at column: {e}")))?,
        })
    }

    async fn find_where(&self, column: &str, value: &str) -> DomainResult<Option<Account>> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM accounts WHERE {column} = ? LIMIT 1");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("account lookup failed: {e}")))?;
        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn exists_where(&self, column: &str, value: &str) -> DomainResult<bool> {
        let query = format!("SELECT 1 FROM accounts WHERE {column} = ? LIMIT 1");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::internal(format!("existence check failed: {e}")))?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn find_by_mobile(&self, mobile: &str) -> DomainResult<Option<Account>> {
        self.find_where("mobile", mobile).await
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<Account>> {
        self.find_where("username", username).await
    }

    async fn exists_mobile(&self, mobile: &str) -> DomainResult<bool> {
        self.exists_where("mobile", mobile).await
    }

    async fn exists_username(&self, username: &str) -> DomainResult<bool> {
        self.exists_where("username", username).await
    }

    async fn insert(&self, account: Account) -> DomainResult<Account> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts
                (username, mobile, password_hash, avatar_config, status,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.username)
        .bind(&account.mobile)
        .bind(&account.password_hash)
        .bind(&account.avatar_config)
        .bind(account.status.as_i16())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("account insert failed: {e}")))?;

        let mut inserted = account;
        inserted.id = result.last_insert_id() as i64;
        Ok(inserted)
    }

    async fn update_password(&self, mobile: &str, password_hash: &str) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = ?, updated_at = ? WHERE mobile = ?",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(mobile)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("password update failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::internal("password update matched no account"));
        }
        Ok(())
    }

    async fn update_login_metadata(&self, id: i64, client_ip: &str) -> DomainResult<()> {
        sqlx::query(
            "UPDATE accounts SET last_login_at = ?, last_login_ip = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(client_ip)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::internal(format!("login metadata update failed: {e}")))?;
        Ok(())
    }
}
