//! Core error type for DESFire APDU operations
//!
//! Every failure on the command path is classified into one of a small set of
//! variants so that callers can tell a dead link from a card that explicitly
//! refused a command, and both from a card that answered with garbage.

use crate::response::status::StatusWord;
use crate::transport::TransportError;

/// Result type for core APDU operations
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The physical link failed or produced no response
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card explicitly rejected the command
    #[error("Card returned error status {0} ({desc})", desc = .0.description())]
    Status(StatusWord),

    /// The card answered with a malformed or truncated response
    #[error("Protocol violation: {0}")]
    Protocol(&'static str),

    /// A continuation chain did not terminate within the configured frame count
    #[error("Continuation chain exceeded {0} frames")]
    ChainLimitExceeded(usize),

    /// The command payload does not fit in a single envelope
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// A numeric field does not fit in its declared wire width
    #[error("Value {value} does not fit in {width} bytes")]
    ValueOutOfRange {
        /// The rejected value
        value: u64,
        /// Width of the wire field in bytes
        width: usize,
    },
}

impl Error {
    /// Create a new status error
    pub const fn status(sw1: u8, sw2: u8) -> Self {
        Self::Status(StatusWord::new(sw1, sw2))
    }

    /// Create a new protocol error
    pub const fn protocol(message: &'static str) -> Self {
        Self::Protocol(message)
    }

    /// Get the status word if the card rejected the command
    pub const fn status_word(&self) -> Option<StatusWord> {
        match self {
            Self::Status(sw) => Some(*sw),
            _ => None,
        }
    }

    /// Check if the error was raised by the transport rather than the card
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
