//! APDU command definitions and traits
//!
//! DESFire native commands are carried in an ISO 7816-4 envelope with a fixed
//! class byte and zero parameter bytes:
//!
//! ```text
//! 90 INS 00 00 Lc <payload> 00
//! ```
//!
//! A command without payload omits `Lc` and is sent as `90 INS 00 00 00`.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Response, Result};

/// Class byte of every wrapped DESFire command
pub const CLA_DESFIRE: u8 = 0x90;

/// Trailer byte (Le) closing every wrapped DESFire command
pub const TRAILER: u8 = 0x00;

/// Largest payload a single short envelope can carry
pub const MAX_PAYLOAD_LEN: usize = 0xFF;

/// Instruction requesting the next frame of a chained exchange
pub const INS_ADDITIONAL_FRAME: u8 = 0xAF;

/// Core trait for typed DESFire commands
pub trait ApduCommand {
    /// Parsed result of a successful exchange
    type Success;

    /// Instruction code (INS)
    fn instruction(&self) -> u8;

    /// Command payload data (optional)
    fn data(&self) -> Option<Bytes>;

    /// Whether the response should be collected through continuation frames
    fn chained(&self) -> bool {
        true
    }

    /// Convert to a generic Command
    fn to_command(&self) -> Command {
        Command {
            ins: self.instruction(),
            data: self.data(),
        }
    }

    /// Convert to raw APDU bytes
    fn to_bytes(&self) -> Result<Bytes> {
        self.to_command().to_bytes()
    }

    /// Parse the (possibly accumulated) response into the command's result type
    fn parse_response(response: Response) -> Result<Self::Success>;
}

/// Generic wrapped DESFire command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Instruction byte
    pub ins: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
}

impl Command {
    /// Create a new command without payload
    pub const fn new(ins: u8) -> Self {
        Self { ins, data: None }
    }

    /// Create a new command with a data payload
    pub fn with_data<T: Into<Bytes>>(ins: u8, data: T) -> Self {
        Self {
            ins,
            data: Some(data.into()),
        }
    }

    /// Command payload, empty when none is set
    pub fn payload(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    /// Calculate length of the serialized command
    pub fn command_length(&self) -> usize {
        match self.data.as_deref() {
            Some(data) if !data.is_empty() => 4 + 1 + data.len() + 1,
            _ => 4 + 1,
        }
    }

    /// Serialize into the wire envelope
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        // Header: CLA, INS, P1, P2
        buffer.put_u8(CLA_DESFIRE);
        buffer.put_u8(self.ins);
        buffer.put_u8(0x00);
        buffer.put_u8(0x00);

        match self.data.as_deref() {
            Some(data) if !data.is_empty() => {
                if data.len() > MAX_PAYLOAD_LEN {
                    return Err(Error::InvalidCommandLength(data.len()));
                }
                buffer.put_u8(data.len() as u8);
                buffer.put_slice(data);
            }
            _ => {}
        }

        buffer.put_u8(TRAILER);
        Ok(buffer.freeze())
    }

    /// Parse a command from raw envelope bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 5 || data[0] != CLA_DESFIRE {
            return Err(Error::InvalidCommandLength(data.len()));
        }

        let ins = data[1];

        // 90 INS 00 00 00
        if data.len() == 5 {
            return Ok(Self::new(ins));
        }

        let lc = data[4] as usize;
        if data.len() != 4 + 1 + lc + 1 {
            return Err(Error::InvalidCommandLength(data.len()));
        }

        Ok(Self::with_data(
            ins,
            Bytes::copy_from_slice(&data[5..5 + lc]),
        ))
    }
}

impl ApduCommand for Command {
    type Success = Response;

    fn instruction(&self) -> u8 {
        self.ins
    }

    fn data(&self) -> Option<Bytes> {
        self.data.clone()
    }

    fn to_command(&self) -> Command {
        self.clone()
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        Ok(response)
    }
}
