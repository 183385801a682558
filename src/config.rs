//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RestError;

/// Generic message sent instead of internal error text when
/// [`EngineConfig::expose_internal_errors`] is off.
pub const GENERIC_INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound for a single handler step. `None` waits forever, which
    /// lets a handler that never resolves stall its request.
    pub handler_timeout_ms: Option<u64>,
    /// Surface the message of 500-class errors to clients.
    pub expose_internal_errors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handler_timeout_ms: None,
            expose_internal_errors: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, RestError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        if config.handler_timeout_ms == Some(0) {
            return Err(RestError::InvalidConfig(
                "handler_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(config)
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }
}
