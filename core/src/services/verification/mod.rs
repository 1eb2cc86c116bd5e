//! Verification code module
//!
//! Issues short-lived numeric codes keyed by mobile and purpose, and
//! consumes them with strict single-use semantics.

mod ledger;

#[cfg(test)]
mod tests;

pub use ledger::{CodeLedger, ConsumeOutcome};
