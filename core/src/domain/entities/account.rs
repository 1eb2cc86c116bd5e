//! Account entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Registered via code but onboarding is incomplete
    Pending,
    /// Fully usable account
    Active,
    /// Administratively disabled, may not log in
    Disabled,
}

impl AccountStatus {
    /// Storage representation (MySQL `status` column)
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Disabled => 0,
            Self::Active => 1,
            Self::Pending => 2,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Active),
            2 => Some(Self::Pending),
            _ => None,
        }
    }
}

/// A registered account
///
/// `id` is assigned by the user directory on insert; before that it holds
/// the placeholder value 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub mobile: String,

    /// Opaque salted-hash blob, absent until the user sets a password
    pub password_hash: Option<String>,

    /// Serialized avatar configuration, absent until the user creates one
    pub avatar_config: Option<String>,

    pub status: AccountStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// New account as produced by registration, before the directory
    /// assigns an id
    pub fn new(username: impl Into<String>, mobile: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username: username.into(),
            mobile: mobile.into(),
            password_hash: None,
            avatar_config: None,
            status: AccountStatus::Pending,
            last_login_at: None,
            last_login_ip: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_avatar(&self) -> bool {
        self.avatar_config.is_some()
    }

    pub fn is_disabled(&self) -> bool {
        self.status == AccountStatus::Disabled
    }
}
