//! Domain entities representing core business objects.

pub mod account;
pub mod token;
pub mod verification;

pub use account::{Account, AccountStatus};
pub use token::Claims;
pub use verification::{Purpose, VerificationCode};
