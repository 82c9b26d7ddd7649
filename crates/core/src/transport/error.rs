//! Error types specific to card transport

/// Transport error type
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection error
    #[error("Failed to connect to device")]
    Connection,

    /// Transmission error
    #[error("Failed to transmit data")]
    Transmission,

    /// Driver error (with code)
    #[error("Driver error code: {0}")]
    Driver(i32),

    /// The card did not answer in time, or a continuation chain ran past its deadline
    #[error("Operation timed out")]
    Timeout,

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a new driver error
    pub const fn driver(code: i32) -> Self {
        Self::Driver(code)
    }

    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }

    /// Whether retrying the exchange could plausibly succeed
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Transmission)
    }
}
