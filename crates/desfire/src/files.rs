//! File store operations on the selected application
//!
//! Writes are single frame: a payload larger than
//! [`DesfireConfig::max_frame_payload`](crate::DesfireConfig) is rejected and
//! must be split by the caller, for instance with
//! [`WriteChunks`](crate::WriteChunks). Value limits are enforced by the card
//! alone.

use bytes::Bytes;
use desfire_apdu_core::CardTransport;
use tracing::{debug, trace};

use crate::Desfire;
use crate::commands::{
    AbortTransactionCommand, ClearRecordFileCommand, CommitTransactionCommand, CreateFileCommand,
    DeleteFileCommand, GetFileIdsCommand, GetFileSettingsCommand, GetValueCommand,
    ReadDataCommand, ReadRecordsCommand, ValueCommand, WriteDataCommand, WriteRecordCommand,
};
use crate::types::{AccessRights, CommMode, CreateOutcome, FileSettings, ValueFileConfig};
use crate::{Error, Result};

impl<T: CardTransport> Desfire<T> {
    fn check_payload(&self, len: usize) -> Result<()> {
        let max = self.config().max_frame_payload;
        if len > max {
            return Err(Error::PayloadTooLarge { len, max });
        }
        Ok(())
    }

    /// List file ids of the selected application
    pub fn file_ids(&mut self) -> Result<Vec<u8>> {
        self.execute(&GetFileIdsCommand)
    }

    /// Delete a file
    pub fn delete_file(&mut self, file_id: u8) -> Result<()> {
        self.execute(&DeleteFileCommand::new(file_id))
    }

    /// Read the settings of a file
    pub fn get_file_settings(&mut self, file_id: u8) -> Result<FileSettings> {
        self.execute(&GetFileSettingsCommand::new(file_id))
    }

    /// Create a standard data file of `size` bytes
    pub fn create_std_data_file(
        &mut self,
        file_id: u8,
        comm_mode: CommMode,
        access: AccessRights,
        size: u32,
    ) -> Result<CreateOutcome> {
        let command = CreateFileCommand::standard(file_id, comm_mode, access, size)?;
        self.create_file(file_id, &command)
    }

    /// Create a value file
    pub fn create_value_file(
        &mut self,
        file_id: u8,
        comm_mode: CommMode,
        access: AccessRights,
        config: &ValueFileConfig,
    ) -> Result<CreateOutcome> {
        let command = CreateFileCommand::value(file_id, comm_mode, access, config);
        self.create_file(file_id, &command)
    }

    /// Create a linear record file
    pub fn create_linear_record_file(
        &mut self,
        file_id: u8,
        comm_mode: CommMode,
        access: AccessRights,
        record_size: u32,
        max_records: u32,
    ) -> Result<CreateOutcome> {
        let command =
            CreateFileCommand::record(file_id, comm_mode, access, record_size, max_records, false)?;
        self.create_file(file_id, &command)
    }

    /// Create a cyclic record file
    ///
    /// Once full, each new record silently replaces the oldest one.
    pub fn create_cyclic_record_file(
        &mut self,
        file_id: u8,
        comm_mode: CommMode,
        access: AccessRights,
        record_size: u32,
        max_records: u32,
    ) -> Result<CreateOutcome> {
        let command =
            CreateFileCommand::record(file_id, comm_mode, access, record_size, max_records, true)?;
        self.create_file(file_id, &command)
    }

    fn create_file(&mut self, file_id: u8, command: &CreateFileCommand) -> Result<CreateOutcome> {
        let outcome = self.execute(command)?;
        debug!(file_id, ?outcome, "Create file");
        Ok(outcome)
    }

    /// Write `data` at `offset` of a standard data file
    pub fn write_data(&mut self, file_id: u8, offset: u32, data: &[u8]) -> Result<()> {
        self.check_payload(data.len())?;
        trace!(file_id, offset, len = data.len(), "Write data");
        self.execute(&WriteDataCommand::new(file_id, offset, data)?)
    }

    /// Read `length` bytes at `offset` of a standard data file
    ///
    /// A length of zero reads from `offset` to the end of the file.
    pub fn read_data(&mut self, file_id: u8, offset: u32, length: u32) -> Result<Bytes> {
        let data = self.execute(&ReadDataCommand::new(file_id, offset, length)?)?;
        if length > 0 && data.len() != length as usize {
            return Err(Error::Protocol("read returned an unexpected number of bytes"));
        }
        Ok(data)
    }

    /// Current balance of a value file
    pub fn get_value(&mut self, file_id: u8) -> Result<i32> {
        self.execute(&GetValueCommand::new(file_id))
    }

    /// Increase the balance; pending until committed
    pub fn credit(&mut self, file_id: u8, amount: i32) -> Result<()> {
        self.execute(&ValueCommand::credit(file_id, amount))
    }

    /// Decrease the balance; pending until committed
    pub fn debit(&mut self, file_id: u8, amount: i32) -> Result<()> {
        self.execute(&ValueCommand::debit(file_id, amount))
    }

    /// Increase the balance within the limited credit allowance; pending until committed
    pub fn limited_credit(&mut self, file_id: u8, amount: i32) -> Result<()> {
        self.execute(&ValueCommand::limited_credit(file_id, amount))
    }

    /// Write `data` at byte `offset` of the next record
    pub fn write_record(&mut self, file_id: u8, offset: u32, data: &[u8]) -> Result<()> {
        self.check_payload(data.len())?;
        self.execute(&WriteRecordCommand::new(file_id, offset, data)?)
    }

    /// Read `count` records starting `record_offset` records back from the newest
    ///
    /// A count of zero reads every record. Records are returned concatenated.
    pub fn read_records(&mut self, file_id: u8, record_offset: u32, count: u32) -> Result<Bytes> {
        self.execute(&ReadRecordsCommand::new(file_id, record_offset, count)?)
    }

    /// Clear a record file; pending until committed
    pub fn clear_record_file(&mut self, file_id: u8) -> Result<()> {
        self.execute(&ClearRecordFileCommand::new(file_id))
    }

    /// Make pending value and record changes durable
    pub fn commit_transaction(&mut self) -> Result<()> {
        self.execute(&CommitTransactionCommand)?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Discard pending value and record changes
    pub fn abort_transaction(&mut self) -> Result<()> {
        self.execute(&AbortTransactionCommand)?;
        debug!("Transaction aborted");
        Ok(())
    }
}
