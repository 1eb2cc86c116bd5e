//! Shared utilities and common types for the AccountKit server
//!
//! This crate provides functionality used across the server modules:
//! - The immutable policy snapshot built at startup
//! - Credential format validation
//! - Error response structure
//! - Mobile number masking for logs

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{AuthPolicy, CredentialRules, LoginPolicy, SmsCodePolicy, TokenPolicy};
pub use types::response::ErrorResponse;
pub use utils::mobile::mask_mobile;
pub use utils::validation::CredentialValidator;
