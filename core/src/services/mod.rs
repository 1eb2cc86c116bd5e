//! Business services containing domain logic and use cases.

pub mod auth;
pub mod dispatch;
pub mod password;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use auth::{AcquireOutcome, AuthService, LockoutTracker, RateLimiter};
pub use dispatch::{CodeDispatcher, DispatchError};
pub use password::PasswordHasher;
pub use token::{MintedToken, TokenService};
pub use verification::{CodeLedger, ConsumeOutcome};
