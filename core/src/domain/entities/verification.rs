//! Verification code entity and purpose tags

use std::fmt;

use chrono::{DateTime, Utc};

/// What a verification code authorizes
///
/// Codes are namespaced per purpose so a login code can never complete a
/// password reset for the same mobile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    Register,
    Login,
    ResetPassword,
}

impl Purpose {
    /// Store-key segment for this purpose
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::ResetPassword => "reset_password",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly issued verification code
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
