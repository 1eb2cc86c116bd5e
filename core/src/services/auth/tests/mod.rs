//! Tests for the authentication module

#[cfg(test)]
mod service_tests;
