//! Typed DESFire commands
//!
//! Each command knows its instruction, encodes its own payload and parses the
//! (continuation-assembled) response. Numeric arguments are range checked when
//! the command is built, so nothing is transmitted for out-of-range values.

pub mod application;
pub mod card;
pub mod data;
pub mod file;
pub mod transaction;
pub mod value;

use desfire_apdu_core::{Response, Result, Status};

use crate::types::CreateOutcome;

pub use application::{
    ChangeKeySettingsCommand, CreateApplicationCommand, DeleteApplicationCommand,
    GetApplicationIdsCommand, GetKeySettingsCommand, GetKeyVersionCommand,
    SelectApplicationCommand,
};
pub use card::{FormatPiccCommand, FreeMemoryCommand, GetVersionCommand};
pub use data::{
    ClearRecordFileCommand, ReadDataCommand, ReadRecordsCommand, WriteDataCommand,
    WriteRecordCommand,
};
pub use file::{CreateFileCommand, DeleteFileCommand, GetFileIdsCommand, GetFileSettingsCommand};
pub use transaction::{AbortTransactionCommand, CommitTransactionCommand};
pub use value::{GetValueCommand, ValueCommand};

/// Interpret the reply to a create command, treating `91 DE` as an idempotent outcome
pub(crate) fn create_outcome(response: Response) -> Result<CreateOutcome> {
    match response.outcome() {
        Status::DuplicateExists => Ok(CreateOutcome::AlreadyExists),
        _ => response.ensure_success().map(|()| CreateOutcome::Created),
    }
}
