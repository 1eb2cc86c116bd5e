//! Value objects returned by authentication flows.

pub mod availability;
pub mod grant;

pub use availability::CheckUsername;
pub use grant::TokenGrant;
