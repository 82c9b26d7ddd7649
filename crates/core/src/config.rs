//! Configuration options for command execution

use std::time::Duration;

/// Default ceiling on follow-up frames in one continuation chain
pub const DEFAULT_MAX_CONTINUATION_FRAMES: usize = 64;

/// Default wall-clock budget for a whole continuation chain
pub const DEFAULT_CHAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration options for a [`CardExecutor`](crate::CardExecutor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Maximum number of continuation frames fetched after the first response
    pub max_continuation_frames: usize,

    /// Deadline for collecting a complete chained response
    pub chain_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_continuation_frames: DEFAULT_MAX_CONTINUATION_FRAMES,
            chain_timeout: DEFAULT_CHAIN_TIMEOUT,
        }
    }
}

impl ExecutorConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the continuation frame limit
    pub const fn with_max_continuation_frames(mut self, frames: usize) -> Self {
        self.max_continuation_frames = frames;
        self
    }

    /// Set the chain deadline
    pub const fn with_chain_timeout(mut self, timeout: Duration) -> Self {
        self.chain_timeout = timeout;
        self
    }
}
