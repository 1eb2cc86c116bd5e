//! Token service module
//!
//! Mints and verifies the three-segment HMAC-SHA256 access tokens used
//! by every authenticated request.

mod service;

#[cfg(test)]
mod tests;

pub use service::{MintedToken, TokenService};
