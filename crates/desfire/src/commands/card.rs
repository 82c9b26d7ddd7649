//! Card-level commands

use bytes::Bytes;
use desfire_apdu_core::codec::read_u24;
use desfire_apdu_core::{ApduCommand, Error, Response, Result};

use crate::constants::ins;
use crate::types::Version;

/// GET VERSION: manufacturing data spread over three frames
#[derive(Debug, Clone, Copy, Default)]
pub struct GetVersionCommand;

impl ApduCommand for GetVersionCommand {
    type Success = Version;

    fn instruction(&self) -> u8 {
        ins::GET_VERSION
    }

    fn data(&self) -> Option<Bytes> {
        None
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        let payload = response.into_payload()?;
        Version::parse(&payload).map_err(|_| Error::protocol("version reply must be 28 bytes"))
    }
}

/// FORMAT PICC: delete every application and file
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatPiccCommand;

impl ApduCommand for FormatPiccCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::FORMAT_PICC
    }

    fn data(&self) -> Option<Bytes> {
        None
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}

/// FREE MEMORY: remaining user memory in bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeMemoryCommand;

impl ApduCommand for FreeMemoryCommand {
    type Success = u32;

    fn instruction(&self) -> u8 {
        ins::FREE_MEMORY
    }

    fn data(&self) -> Option<Bytes> {
        None
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        read_u24(&response.into_exact_payload(3)?)
    }
}
