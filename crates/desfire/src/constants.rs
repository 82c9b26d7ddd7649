//! Constants for the DESFire EV1 native command set

/// Largest payload a single write frame reliably carries on common readers
pub const MAX_FRAME_PAYLOAD: usize = 47;

/// Highest key slot number accepted by EV1 applications
pub const MAX_KEY_NO: u8 = 13;

/// Maximum number of keys per application
pub const MAX_KEYS: u8 = 14;

/// Length of a DES block, challenge and key
pub const BLOCK_LEN: usize = 8;

/// Instruction codes
pub mod ins {
    /// SELECT APPLICATION
    pub const SELECT_APPLICATION: u8 = 0x5A;
    /// AUTHENTICATE (legacy DES)
    pub const AUTHENTICATE_LEGACY: u8 = 0x0A;
    /// AUTHENTICATE ISO
    pub const AUTHENTICATE_ISO: u8 = 0x1A;
    /// ADDITIONAL FRAME
    pub const ADDITIONAL_FRAME: u8 = 0xAF;
    /// GET APPLICATION IDS
    pub const GET_APPLICATION_IDS: u8 = 0x6A;
    /// CREATE APPLICATION
    pub const CREATE_APPLICATION: u8 = 0xCA;
    /// DELETE APPLICATION
    pub const DELETE_APPLICATION: u8 = 0xDA;
    /// CHANGE KEY SETTINGS
    pub const CHANGE_KEY_SETTINGS: u8 = 0x54;
    /// GET KEY SETTINGS
    pub const GET_KEY_SETTINGS: u8 = 0x45;
    /// GET KEY VERSION
    pub const GET_KEY_VERSION: u8 = 0x64;
    /// FREE MEMORY
    pub const FREE_MEMORY: u8 = 0x6E;
    /// GET FILE IDS
    pub const GET_FILE_IDS: u8 = 0x6F;
    /// GET FILE SETTINGS
    pub const GET_FILE_SETTINGS: u8 = 0xF5;
    /// DELETE FILE
    pub const DELETE_FILE: u8 = 0xDF;
    /// CREATE STD DATA FILE
    pub const CREATE_STD_DATA_FILE: u8 = 0xCD;
    /// CREATE VALUE FILE
    pub const CREATE_VALUE_FILE: u8 = 0xCC;
    /// CREATE LINEAR RECORD FILE
    pub const CREATE_LINEAR_RECORD_FILE: u8 = 0xC1;
    /// CREATE CYCLIC RECORD FILE
    pub const CREATE_CYCLIC_RECORD_FILE: u8 = 0xC0;
    /// WRITE DATA
    pub const WRITE_DATA: u8 = 0x3D;
    /// READ DATA
    pub const READ_DATA: u8 = 0xBD;
    /// WRITE RECORD
    pub const WRITE_RECORD: u8 = 0x3B;
    /// READ RECORDS
    pub const READ_RECORDS: u8 = 0xBB;
    /// GET VALUE
    pub const GET_VALUE: u8 = 0x6C;
    /// CREDIT
    pub const CREDIT: u8 = 0x0C;
    /// DEBIT
    pub const DEBIT: u8 = 0xDC;
    /// LIMITED CREDIT
    pub const LIMITED_CREDIT: u8 = 0x1C;
    /// CLEAR RECORD FILE
    pub const CLEAR_RECORD_FILE: u8 = 0xEB;
    /// COMMIT TRANSACTION
    pub const COMMIT_TRANSACTION: u8 = 0xC7;
    /// ABORT TRANSACTION
    pub const ABORT_TRANSACTION: u8 = 0xA7;
    /// FORMAT PICC
    pub const FORMAT_PICC: u8 = 0xFC;
    /// GET VERSION
    pub const GET_VERSION: u8 = 0x60;
}

/// Status words
pub mod status {
    pub use desfire_apdu_core::response::status::common::*;
}

/// File type bytes reported by GET FILE SETTINGS
pub mod file_type {
    /// Standard data file
    pub const STANDARD: u8 = 0x00;
    /// Backup data file
    pub const BACKUP: u8 = 0x01;
    /// Value file
    pub const VALUE: u8 = 0x02;
    /// Linear record file
    pub const LINEAR_RECORD: u8 = 0x03;
    /// Cyclic record file
    pub const CYCLIC_RECORD: u8 = 0x04;
}
