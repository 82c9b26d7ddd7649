//! Transaction commands

use bytes::Bytes;
use desfire_apdu_core::{ApduCommand, Response, Result};

use crate::constants::ins;

/// COMMIT TRANSACTION: make pending value and record changes durable
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitTransactionCommand;

impl ApduCommand for CommitTransactionCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::COMMIT_TRANSACTION
    }

    fn data(&self) -> Option<Bytes> {
        None
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}

/// ABORT TRANSACTION: discard pending value and record changes
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortTransactionCommand;

impl ApduCommand for AbortTransactionCommand {
    type Success = ();

    fn instruction(&self) -> u8 {
        ins::ABORT_TRANSACTION
    }

    fn data(&self) -> Option<Bytes> {
        None
    }

    fn parse_response(response: Response) -> Result<Self::Success> {
        response.ensure_success()
    }
}
