//! Value file commands

use bytes::{BufMut, Bytes, BytesMut};
use desfire_apdu_core::codec::{encode_i32, read_i32};
use desfire_apdu_core::{ApduCommand, Response, Result};

use crate::constants::ins;

/// GET VALUE
#[derive(Debug, Clone, Copy)]
pub struct GetValueCommand {
    file_id: u8,
}

impl GetValueCommand {
    /// Read the balance of `file_id`
    pub const fn new(file_id: u8) -> Self {
        Self { file_id }
    }
}

impl ApduCommand for GetValueCommand {
    type Success = i32;

    fn instruction(&self) -> u8 {
        ins::GET_VALUE
    }

    fn data(&self) -> Option<Bytes> {
        Some(Bytes::copy_from_slice(&[self.file_id]))
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        read_i32(&response.into_exact_payload(4)?)
    }
}

/// CREDIT, DEBIT and LIMITED CREDIT
///
/// The change stays pending until the transaction is committed.
#[derive(Debug, Clone, Copy)]
pub struct ValueCommand {
    ins: u8,
    file_id: u8,
    amount: i32,
}

impl ValueCommand {
    /// Increase the balance
    pub const fn credit(file_id: u8, amount: i32) -> Self {
        Self {
            ins: ins::CREDIT,
            file_id,
            amount,
        }
    }

    /// Decrease the balance
    pub const fn debit(file_id: u8, amount: i32) -> Self {
        Self {
            ins: ins::DEBIT,
            file_id,
            amount,
        }
    }

    /// Increase the balance by at most the amount debited in earlier transactions
    pub const fn limited_credit(file_id: u8, amount: i32) -> Self {
        Self {
            ins: ins::LIMITED_CREDIT,
            file_id,
            amount,
        }
    }
}

impl ApduCommand for ValueCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        self.ins
    }

    fn data(&self) -> Option<Bytes> {
        let mut buf = BytesMut::with_capacity(5);
        buf.put_u8(self.file_id);
        buf.put_slice(&encode_i32(self.amount));
        Some(buf.freeze())
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}
