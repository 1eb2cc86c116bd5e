//! Domain error types
//!
//! Every failure a flow can surface maps to a stable business code that
//! clients branch on. Infrastructure failures collapse into
//! [`DomainError::Internal`] and are reported to clients as a generic
//! "service busy" response; the real cause goes to the logs only.

use std::collections::HashMap;

use serde_json::json;
use thiserror::Error;

use ak_shared::types::ErrorResponse;

/// Result alias used throughout the domain layer
pub type DomainResult<T> = Result<T, DomainError>;

/// Authentication and account-protection failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid mobile number format")]
    InvalidMobileFormat,

    #[error("Invalid username format")]
    InvalidUsernameFormat,

    #[error("Mobile number is already registered")]
    MobileAlreadyRegistered,

    #[error("Username is already taken")]
    UsernameAlreadyExists,

    #[error("Incorrect verification code")]
    InvalidCode,

    #[error("Verification code has expired")]
    CodeExpired,

    #[error("Incorrect mobile number or password")]
    InvalidCredentials,

    #[error("Account is locked, try again in {minutes} minutes")]
    AccountLocked { minutes: u64 },

    #[error("Mobile number is not registered")]
    MobileNotRegistered,

    #[error("Request too frequent, retry in {seconds} seconds")]
    RequestTooFrequent { seconds: u64 },

    #[error("Invalid password format")]
    InvalidPasswordFormat,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl AuthError {
    /// Numeric business code carried alongside the HTTP status
    pub fn business_code(&self) -> u16 {
        match self {
            Self::InvalidMobileFormat => 4001,
            Self::InvalidUsernameFormat => 4002,
            Self::MobileAlreadyRegistered => 4003,
            Self::UsernameAlreadyExists => 4004,
            Self::InvalidCode => 4101,
            Self::CodeExpired => 4102,
            Self::InvalidCredentials => 4201,
            Self::AccountLocked { .. } => 4202,
            Self::MobileNotRegistered => 4203,
            Self::RequestTooFrequent { .. } => 4301,
            Self::InvalidPasswordFormat => 4401,
            Self::PasswordMismatch => 4402,
        }
    }

    /// Stable machine-readable code for the response body
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMobileFormat => "INVALID_MOBILE_FORMAT",
            Self::InvalidUsernameFormat => "INVALID_USERNAME_FORMAT",
            Self::MobileAlreadyRegistered => "MOBILE_ALREADY_REGISTERED",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::InvalidCode => "INVALID_CODE",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked { .. } => "ACCOUNT_LOCKED",
            Self::MobileNotRegistered => "MOBILE_NOT_REGISTERED",
            Self::RequestTooFrequent { .. } => "REQUEST_TOO_FREQUENT",
            Self::InvalidPasswordFormat => "INVALID_PASSWORD_FORMAT",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
        }
    }
}

/// Token parsing and verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token is not a valid three-segment token")]
    InvalidFormat,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token claims are malformed")]
    InvalidClaims,
}

/// Umbrella error for the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Wrap an infrastructure failure
    pub fn internal(source: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: source.to_string(),
        }
    }

    /// Numeric business code for the response envelope
    pub fn business_code(&self) -> u16 {
        match self {
            Self::Auth(e) => e.business_code(),
            // Token failures surface as credential failures to clients
            Self::Token(_) => 4201,
            Self::Internal { .. } => 5000,
        }
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        match err {
            DomainError::Auth(e) => {
                let response = ErrorResponse::new(e.error_code(), e.to_string());
                match e {
                    AuthError::RequestTooFrequent { seconds } => response.with_details(
                        HashMap::from([("retry_after".to_string(), json!(seconds))]),
                    ),
                    AuthError::AccountLocked { minutes } => response.with_details(
                        HashMap::from([("lock_minutes".to_string(), json!(minutes))]),
                    ),
                    _ => response,
                }
            }
            DomainError::Token(_) => {
                ErrorResponse::new("INVALID_CREDENTIALS", "Invalid or expired token")
            }
            // Never leak internal causes to clients
            DomainError::Internal { .. } => {
                ErrorResponse::new("SERVICE_BUSY", "Service is busy, please try again later")
            }
        }
    }
}
