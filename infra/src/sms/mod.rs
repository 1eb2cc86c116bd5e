//! SMS delivery channels for verification codes
//!
//! Production deployments plug a vendor gateway in behind
//! [`ak_core::services::CodeDispatcher`]. The [`LogSmsGateway`] here is
//! for development and staging: it writes the send to the log instead of
//! the network. The code itself only appears at debug level so ordinary
//! log collection never captures it.

use async_trait::async_trait;
use tracing::{debug, info};

use ak_core::domain::entities::Purpose;
use ak_core::services::dispatch::{CodeDispatcher, DispatchError};
use ak_shared::utils::mobile::mask_mobile;

/// Dispatcher that logs instead of sending
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSmsGateway;

impl LogSmsGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CodeDispatcher for LogSmsGateway {
    async fn dispatch(
        &self,
        mobile: &str,
        purpose: Purpose,
        code: &str,
    ) -> Result<(), DispatchError> {
        info!(
            mobile = %mask_mobile(mobile),
            %purpose,
            "sms dispatch (log-only gateway)"
        );
        debug!(mobile = %mask_mobile(mobile), %purpose, code, "sms code");
        Ok(())
    }
}
