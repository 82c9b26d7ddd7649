//! Error taxonomy for DESFire operations

use desfire_apdu_core::{StatusWord, TransportError};

/// Result type for DESFire operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for DESFire operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The physical link failed or produced no response
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card explicitly rejected the operation
    #[error("Card returned error status {0} ({desc})", desc = .0.description())]
    Status(StatusWord),

    /// The mutual authentication handshake did not complete
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(#[from] AuthFailure),

    /// The card answered with a malformed or truncated response
    #[error("Protocol violation: {0}")]
    Protocol(&'static str),

    /// A continuation chain did not terminate within the configured frame count
    #[error("Continuation chain exceeded {0} frames")]
    ChainLimitExceeded(usize),

    /// A single write carries more data than one frame can hold
    #[error("Payload of {len} bytes exceeds the {max} byte frame limit")]
    PayloadTooLarge {
        /// Length of the rejected payload
        len: usize,
        /// Configured frame payload limit
        max: usize,
    },

    /// A numeric argument does not fit in its wire field
    #[error("Value {value} does not fit in {width} bytes")]
    ValueOutOfRange {
        /// The rejected value
        value: u64,
        /// Width of the wire field in bytes
        width: usize,
    },

    /// An argument is outside the range the command set accepts
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Reason a mutual authentication attempt was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// The card refused the authenticate request
    #[error("challenge request rejected with status {0}")]
    RequestRejected(StatusWord),

    /// The encrypted challenge was not a single DES block
    #[error("challenge of {0} bytes, expected 8")]
    MalformedChallenge(usize),

    /// The card refused the host token
    #[error("token rejected with status {0}")]
    ResponseRejected(StatusWord),

    /// The card's final reply was not a single DES block
    #[error("reply of {0} bytes, expected 8")]
    MalformedReply(usize),

    /// The card's reply did not decrypt to the rotated host challenge
    #[error("card did not prove possession of the key")]
    ChallengeMismatch,
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// No or garbled response from the link
    Transport,
    /// The card rejected the operation with a status word
    Status,
    /// The handshake failed
    Authentication,
    /// Malformed, truncated or unterminated response
    Protocol,
    /// Rejected locally before anything was transmitted
    Usage,
}

impl Error {
    /// Create a new status error
    pub const fn status(sw1: u8, sw2: u8) -> Self {
        Self::Status(StatusWord::new(sw1, sw2))
    }

    /// Classify this error
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Status(_) => ErrorCategory::Status,
            Self::AuthenticationFailed(_) => ErrorCategory::Authentication,
            Self::Protocol(_) | Self::ChainLimitExceeded(_) => ErrorCategory::Protocol,
            Self::PayloadTooLarge { .. } | Self::ValueOutOfRange { .. } | Self::InvalidArgument(_) => {
                ErrorCategory::Usage
            }
        }
    }

    /// Get the status word if the card rejected the operation
    pub const fn status_word(&self) -> Option<StatusWord> {
        match self {
            Self::Status(sw) => Some(*sw),
            _ => None,
        }
    }
}

impl From<desfire_apdu_core::Error> for Error {
    fn from(err: desfire_apdu_core::Error) -> Self {
        use desfire_apdu_core::Error as Core;

        match err {
            Core::Transport(e) => Self::Transport(e),
            Core::Status(sw) => Self::Status(sw),
            Core::Protocol(msg) => Self::Protocol(msg),
            Core::ChainLimitExceeded(frames) => Self::ChainLimitExceeded(frames),
            Core::InvalidCommandLength(len) => Self::PayloadTooLarge {
                len,
                max: desfire_apdu_core::command::MAX_PAYLOAD_LEN,
            },
            Core::ValueOutOfRange { value, width } => Self::ValueOutOfRange { value, width },
        }
    }
}
