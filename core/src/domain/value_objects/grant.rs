//! Token grant returned by registration and login flows

use serde::Serialize;

use crate::domain::entities::Account;

/// Successful authentication result handed to the transport layer
///
/// Registration responses tell the client it still needs to create an
/// avatar; login responses report whether one already exists. The unused
/// flag is omitted from the serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant {
    pub user_id: i64,
    pub username: String,
    pub mobile: String,
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub need_create_avatar: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_created: Option<bool>,
}

impl TokenGrant {
    /// Grant issued right after registration
    pub fn for_registration(account: &Account, token: String, expires_in: i64) -> Self {
        Self {
            need_create_avatar: Some(true),
            avatar_created: None,
            ..Self::base(account, token, expires_in)
        }
    }

    /// Grant issued on login
    pub fn for_login(account: &Account, token: String, expires_in: i64) -> Self {
        Self {
            need_create_avatar: None,
            avatar_created: Some(account.has_avatar()),
            ..Self::base(account, token, expires_in)
        }
    }

    fn base(account: &Account, token: String, expires_in: i64) -> Self {
        Self {
            user_id: account.id,
            username: account.username.clone(),
            mobile: account.mobile.clone(),
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            need_create_avatar: None,
            avatar_created: None,
        }
    }
}
