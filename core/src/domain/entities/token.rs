//! Token claims

use serde::{Deserialize, Serialize};

/// Claims carried in the payload segment of an access token
///
/// Field order matters: the wire payload is the serialization of this
/// struct, so reordering fields changes issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id of the subject
    pub user_id: i64,
    pub username: String,
    pub mobile: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn is_expired_at(&self, now_epoch_seconds: i64) -> bool {
        now_epoch_seconds > self.exp
    }
}
