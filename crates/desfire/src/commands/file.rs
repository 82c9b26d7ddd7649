//! File management commands

use bytes::{BufMut, Bytes, BytesMut};
use desfire_apdu_core::codec::{encode_i32, encode_u24};
use desfire_apdu_core::{ApduCommand, Error, Response, Result};

use crate::constants::ins;
use crate::types::{AccessRights, CommMode, CreateOutcome, FileKind, FileSettings, ValueFileConfig};

/// GET FILE IDS
#[derive(Debug, Clone, Copy, Default)]
pub struct GetFileIdsCommand;

impl ApduCommand for GetFileIdsCommand {
    type Success = Vec<u8>;

    fn instruction(&self) -> u8 {
        ins::GET_FILE_IDS
    }

    fn data(&self) -> Option<Bytes> {
        None
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        Ok(response.into_payload()?.to_vec())
    }
}

/// DELETE FILE
#[derive(Debug, Clone, Copy)]
pub struct DeleteFileCommand {
    file_id: u8,
}

impl DeleteFileCommand {
    /// Delete `file_id` from the selected application
    pub const fn new(file_id: u8) -> Self {
        Self { file_id }
    }
}

impl ApduCommand for DeleteFileCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::DELETE_FILE
    }

    fn data(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(&[self.file_id]))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}

/// GET FILE SETTINGS
#[derive(Debug, Clone, Copy)]
pub struct GetFileSettingsCommand {
    file_id: u8,
}

impl GetFileSettingsCommand {
    /// Query the settings of `file_id`
    pub const fn new(file_id: u8) -> Self {
        Self { file_id }
    }
}

impl ApduCommand for GetFileSettingsCommand {
    type Success = FileSettings;

    fn instruction(&self) -> u8 {
        ins::GET_FILE_SETTINGS
    }

    fn data(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(&[self.file_id]))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        let payload = response.into_payload()?;
        FileSettings::parse(&payload).map_err(|_| Error::protocol("malformed file settings"))
    }
}

/// CREATE STD DATA FILE, CREATE VALUE FILE, CREATE LINEAR/CYCLIC RECORD FILE
///
/// All four share the preamble `file_id, comm_mode, access_rights[2]`,
/// followed by kind-specific parameters.
#[derive(Debug, Clone)]
pub struct CreateFileCommand {
    kind: FileKind,
    payload: Bytes,
}

impl CreateFileCommand {
    fn preamble(file_id: u8, comm_mode: CommMode, access: AccessRights) -> BytesMut {
        let mut buf = BytesMut::with_capacity(17);
        buf.put_u8(file_id);
        buf.put_u8(comm_mode.to_byte());
        buf.put_slice(&access.to_bytes());
        buf
    }

    /// Standard data file of `size` bytes
    pub fn standard(
        file_id: u8,
        comm_mode: CommMode,
        access: AccessRights,
        size: u32,
    ) -> Result<Self> {
        let mut buf = Self::preamble(file_id, comm_mode, access);
        buf.put_slice(&encode_u24(size)?);
        Ok(Self {
            kind: FileKind::Standard,
            payload: buf.freeze(),
        })
    }

    /// Value file with the given limits and initial balance
    pub fn value(
        file_id: u8,
        comm_mode: CommMode,
        access: AccessRights,
        config: &ValueFileConfig,
    ) -> Self {
        let mut buf = Self::preamble(file_id, comm_mode, access);
        buf.put_slice(&encode_i32(config.lower_limit));
        buf.put_slice(&encode_i32(config.upper_limit));
        buf.put_slice(&encode_i32(config.initial_value));
        buf.put_u8(u8::from(config.limited_credit));
        Self {
            kind: FileKind::Value,
            payload: buf.freeze(),
        }
    }

    /// Linear or cyclic record file
    pub fn record(
        file_id: u8,
        comm_mode: CommMode,
        access: AccessRights,
        record_size: u32,
        max_records: u32,
        cyclic: bool,
    ) -> Result<Self> {
        let mut buf = Self::preamble(file_id, comm_mode, access);
        buf.put_slice(&encode_u24(record_size)?);
        buf.put_slice(&encode_u24(max_records)?);
        Ok(Self {
            kind: if cyclic {
                FileKind::CyclicRecord
            } else {
                FileKind::LinearRecord
            },
            payload: buf.freeze(),
        })
    }
}

impl ApduCommand for CreateFileCommand {
    type Success = CreateOutcome;

    fn instruction(&self) -> u8 {
        match self.kind {
            FileKind::Standard => ins::CREATE_STD_DATA_FILE,
            FileKind::Value => ins::CREATE_VALUE_FILE,
            FileKind::LinearRecord => ins::CREATE_LINEAR_RECORD_FILE,
            FileKind::CyclicRecord => ins::CREATE_CYCLIC_RECORD_FILE,
        }
    }

    fn data(&self) -> Option<Bytes> {
        Some(self.payload.clone())
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        super::create_outcome(response)
    }
}
