//! Verification code delivery contract
//!
//! Dispatch is fire-and-forget from the flows' perspective: a delivery
//! failure is logged but never fails the request, so the vendor cannot be
//! probed through error responses.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::Purpose;

/// Failure reported by a delivery channel
#[derive(Debug, Clone, Error)]
#[error("code dispatch failed: {message}")]
pub struct DispatchError {
    pub message: String,
}

impl DispatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Delivery channel for verification codes (SMS in production)
#[async_trait]
pub trait CodeDispatcher: Send + Sync {
    async fn dispatch(&self, mobile: &str, purpose: Purpose, code: &str)
        -> Result<(), DispatchError>;
}
