//! Configuration options for a DESFire session

use desfire_apdu_core::ExecutorConfig;

use crate::constants::MAX_FRAME_PAYLOAD;

/// Configuration options for [`Desfire`](crate::Desfire)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesfireConfig {
    /// Continuation limits of the underlying executor
    pub executor: ExecutorConfig,

    /// Largest data payload accepted by a single write
    pub max_frame_payload: usize,
}

impl Default for DesfireConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorConfig::default(),
            max_frame_payload: MAX_FRAME_PAYLOAD,
        }
    }
}

impl DesfireConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the executor limits
    pub const fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    /// Set the single-write payload limit
    pub const fn with_max_frame_payload(mut self, max: usize) -> Self {
        self.max_frame_payload = max;
        self
    }
}
