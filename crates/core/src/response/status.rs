//! Status word definitions for DESFire native responses
//!
//! Wrapped DESFire responses always carry `SW1 = 0x91`; the native status
//! code travels in `SW2`.

use derive_more::Display;
use tracing::Level;

/// Status Word (SW1-SW2) from an APDU response
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("{sw1:02X} {sw2:02X}")]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

/// Classification of a status word into the outcomes the driver acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Operation completed (91 00)
    Success,
    /// More frames follow; fetch them with a continuation command (91 AF)
    Continuation,
    /// The application or file already exists (91 DE)
    DuplicateExists,
    /// Any other status, surfaced verbatim
    Error(u8, u8),
}

impl StatusWord {
    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Create from a u16 value (SW1 | SW2)
    pub const fn from_u16(status: u16) -> Self {
        Self {
            sw1: (status >> 8) as u8,
            sw2: status as u8,
        }
    }

    /// Convert to a u16 value (SW1 | SW2)
    pub const fn to_u16(&self) -> u16 {
        ((self.sw1 as u16) << 8) | (self.sw2 as u16)
    }

    /// Classify this status word
    pub const fn classify(&self) -> Status {
        match (self.sw1, self.sw2) {
            (0x91, 0x00) => Status::Success,
            (0x91, 0xAF) => Status::Continuation,
            (0x91, 0xDE) => Status::DuplicateExists,
            (sw1, sw2) => Status::Error(sw1, sw2),
        }
    }

    /// Check if this status word indicates success (91 00)
    pub const fn is_success(&self) -> bool {
        matches!(self.classify(), Status::Success)
    }

    /// Check if this status word asks for a continuation frame (91 AF)
    pub const fn is_continuation(&self) -> bool {
        matches!(self.classify(), Status::Continuation)
    }

    /// Check if this status word reports a duplicate (91 DE)
    pub const fn is_duplicate(&self) -> bool {
        matches!(self.classify(), Status::DuplicateExists)
    }

    /// Get the appropriate tracing level for this status word
    pub const fn tracing_level(&self) -> Level {
        match self.classify() {
            Status::Success | Status::Continuation => Level::DEBUG,
            Status::DuplicateExists => Level::INFO,
            Status::Error(..) => Level::WARN,
        }
    }

    /// Get a description of this status word
    pub const fn description(&self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x91, 0x00) => "Operation ok",
            (0x91, 0x0C) => "No changes",
            (0x91, 0x0E) => "Out of EEPROM memory",
            (0x91, 0x1C) => "Illegal command code",
            (0x91, 0x1E) => "Integrity error",
            (0x91, 0x40) => "No such key",
            (0x91, 0x7E) => "Length error",
            (0x91, 0x9D) => "Permission denied",
            (0x91, 0x9E) => "Parameter error",
            (0x91, 0xA0) => "Application not found",
            (0x91, 0xA1) => "Application integrity error",
            (0x91, 0xAE) => "Authentication error",
            (0x91, 0xAF) => "Additional frame",
            (0x91, 0xBE) => "Boundary error",
            (0x91, 0xC1) => "PICC integrity error",
            (0x91, 0xCA) => "Command aborted",
            (0x91, 0xCD) => "PICC disabled",
            (0x91, 0xCE) => "Count error",
            (0x91, 0xDE) => "Duplicate error",
            (0x91, 0xEE) => "EEPROM error",
            (0x91, 0xF0) => "File not found",
            (0x91, 0xF1) => "File integrity error",
            (0x6A, 0x82) => "File not found",
            (0x6D, 0x00) => "Instruction code not supported or invalid",
            (0x6E, 0x00) => "Class not supported",
            _ => "Unknown status word",
        }
    }
}

impl From<(u8, u8)> for StatusWord {
    fn from(tuple: (u8, u8)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

impl From<u16> for StatusWord {
    fn from(status: u16) -> Self {
        Self::from_u16(status)
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> Self {
        status.to_u16()
    }
}

/// Common status words
pub mod common {
    use super::StatusWord;

    /// Operation ok (91 00)
    pub const SUCCESS: StatusWord = StatusWord::new(0x91, 0x00);

    /// Additional frame expected (91 AF)
    pub const ADDITIONAL_FRAME: StatusWord = StatusWord::new(0x91, 0xAF);

    /// Duplicate application or file (91 DE)
    pub const DUPLICATE: StatusWord = StatusWord::new(0x91, 0xDE);

    /// Length error (91 7E)
    pub const LENGTH_ERROR: StatusWord = StatusWord::new(0x91, 0x7E);

    /// Permission denied (91 9D)
    pub const PERMISSION_DENIED: StatusWord = StatusWord::new(0x91, 0x9D);

    /// Parameter error (91 9E)
    pub const PARAMETER_ERROR: StatusWord = StatusWord::new(0x91, 0x9E);

    /// Application not found (91 A0)
    pub const APPLICATION_NOT_FOUND: StatusWord = StatusWord::new(0x91, 0xA0);

    /// Authentication error (91 AE)
    pub const AUTHENTICATION_ERROR: StatusWord = StatusWord::new(0x91, 0xAE);

    /// Boundary error (91 BE)
    pub const BOUNDARY_ERROR: StatusWord = StatusWord::new(0x91, 0xBE);

    /// Count error (91 CE)
    pub const COUNT_ERROR: StatusWord = StatusWord::new(0x91, 0xCE);

    /// File not found (91 F0)
    pub const FILE_NOT_FOUND: StatusWord = StatusWord::new(0x91, 0xF0);

    /// Illegal command code (91 1C)
    pub const ILLEGAL_COMMAND: StatusWord = StatusWord::new(0x91, 0x1C);

    /// No such key (91 40)
    pub const NO_SUCH_KEY: StatusWord = StatusWord::new(0x91, 0x40);
}
