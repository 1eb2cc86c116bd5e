//! Authentication module
//!
//! The [`AuthService`] orchestrator drives the six credential flows
//! (send register code, register, password login, SMS login, send reset
//! code, reset password) over the supporting services in this module.

mod lockout;
mod rate_limiter;
mod service;

#[cfg(test)]
mod tests;

pub use lockout::LockoutTracker;
pub use rate_limiter::{AcquireOutcome, RateLimiter};
pub use service::AuthService;
