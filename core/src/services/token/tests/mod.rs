//! Tests for the token service
