//! # AccountKit Core
//!
//! Domain layer for the AccountKit credential service: account entities,
//! the authentication orchestrator and its supporting services (password
//! hashing, token minting, verification codes, rate limiting, lockout),
//! plus the contracts the infrastructure layer implements.
//!
//! Everything here is storage-agnostic. Persistence goes through the
//! [`repositories::UserDirectory`] trait and short-lived state through the
//! [`store::EphemeralStore`] trait; `ak_infra` supplies the MySQL and
//! Redis implementations.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use domain::entities::{Account, AccountStatus, Claims, Purpose, VerificationCode};
pub use domain::value_objects::{CheckUsername, TokenGrant};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::UserDirectory;
pub use services::{
    AuthService, CodeDispatcher, CodeLedger, ConsumeOutcome, LockoutTracker, PasswordHasher,
    RateLimiter, TokenService,
};
pub use store::{EphemeralStore, InMemoryStore, StoreError, StoreResult};
