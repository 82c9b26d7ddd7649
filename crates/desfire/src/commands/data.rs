//! Data and record file access commands

use bytes::{BufMut, Bytes, BytesMut};
use desfire_apdu_core::codec::encode_u24;
use desfire_apdu_core::{ApduCommand, Response, Result};

use crate::constants::ins;

/// `file_id, offset[3], length[3]` followed by `data`
fn addressed_payload(file_id: u8, offset: u32, length: u32, data: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(7 + data.len());
    buf.put_u8(file_id);
    buf.put_slice(&encode_u24(offset)?);
    buf.put_slice(&encode_u24(length)?);
    buf.put_slice(data);
    Ok(buf.freeze())
}

fn data_len(data: &[u8]) -> u32 {
    u32::try_from(data.len()).unwrap_or(u32::MAX)
}

/// WRITE DATA to a standard data file
#[derive(Debug, Clone)]
pub struct WriteDataCommand {
    payload: Bytes,
}

impl WriteDataCommand {
    /// Write `data` at `offset`; the embedded length is always `data.len()`
    pub fn new(file_id: u8, offset: u32, data: &[u8]) -> Result<Self> {
        Ok(Self {
            payload: addressed_payload(file_id, offset, data_len(data), data)?,
        })
    }
}

impl ApduCommand for WriteDataCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::WRITE_DATA
    }

    fn data(&self) -> Option<Bytes> {
        Some(self.payload.clone())
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}

/// READ DATA from a standard data file
#[derive(Debug, Clone)]
pub struct ReadDataCommand {
    payload: Bytes,
}

impl ReadDataCommand {
    /// Read `length` bytes at `offset`; zero reads to the end of the file
    pub fn new(file_id: u8, offset: u32, length: u32) -> Result<Self> {
        Ok(Self {
            payload: addressed_payload(file_id, offset, length, &[])?,
        })
    }
}

impl ApduCommand for ReadDataCommand {
    type Success = Bytes;

    fn instruction(&self) -> u8 {
        ins::READ_DATA
    }

    fn data(&self) -> Option<Bytes> {
        Some(self.payload.clone())
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.into_payload()
    }
}

/// WRITE RECORD to a linear or cyclic record file
#[derive(Debug, Clone)]
pub struct WriteRecordCommand {
    payload: Bytes,
}

impl WriteRecordCommand {
    /// Write `data` at byte `offset` within the record being built
    pub fn new(file_id: u8, offset: u32, data: &[u8]) -> Result<Self> {
        Ok(Self {
            payload: addressed_payload(file_id, offset, data_len(data), data)?,
        })
    }
}

impl ApduCommand for WriteRecordCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::WRITE_RECORD
    }

    fn data(&self) -> Option<Bytes> {
        Some(self.payload.clone())
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}

/// READ RECORDS from a linear or cyclic record file
#[derive(Debug, Clone)]
pub struct ReadRecordsCommand {
    payload: Bytes,
}

impl ReadRecordsCommand {
    /// Read `count` records starting `record_offset` records back from the newest;
    /// a count of zero reads every record
    pub fn new(file_id: u8, record_offset: u32, count: u32) -> Result<Self> {
        Ok(Self {
            payload: addressed_payload(file_id, record_offset, count, &[])?,
        })
    }
}

impl ApduCommand for ReadRecordsCommand {
    type Success = Bytes;

    fn instruction(&self) -> u8 {
        ins::READ_RECORDS
    }

    fn data(&self) -> Option<Bytes> {
        Some(self.payload.clone())
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.into_payload()
    }
}

/// CLEAR RECORD FILE
#[derive(Debug, Clone, Copy)]
pub struct ClearRecordFileCommand {
    file_id: u8,
}

impl ClearRecordFileCommand {
    /// Discard every record of `file_id` at the next commit
    pub const fn new(file_id: u8) -> Self {
        Self { file_id }
    }
}

impl ApduCommand for ClearRecordFileCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::CLEAR_RECORD_FILE
    }

    fn data(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(&[self.file_id]))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}
