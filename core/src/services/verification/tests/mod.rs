//! Tests for the verification code ledger
