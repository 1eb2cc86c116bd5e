//! Utility functions shared across layers

pub mod mobile;
pub mod validation;
