//! Value types exchanged with the card

use std::fmt;

use derive_more::{Deref, Display};
use desfire_apdu_core::codec::{read_i32, read_u24};

use crate::constants::file_type;
use crate::{Error, Result};

/// 3-byte application identifier
///
/// The all-zero identifier addresses the PICC (card root) level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deref)]
pub struct ApplicationId([u8; 3]);

impl ApplicationId {
    /// The PICC (card root) context
    pub const PICC: Self = Self([0x00; 3]);

    /// Wrap raw identifier bytes
    pub const fn new(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes as sent on the wire
    pub const fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    /// Check if this is the PICC identifier
    pub const fn is_picc(&self) -> bool {
        matches!(self.0, [0, 0, 0])
    }
}

impl From<[u8; 3]> for ApplicationId {
    fn from(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ApplicationId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 3] = bytes
            .try_into()
            .map_err(|_| Error::InvalidArgument("application ids are 3 bytes"))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

/// Communication mode of a file
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommMode {
    /// Plain communication
    #[default]
    #[display("plain")]
    Plain,
    /// Plain communication secured by a MAC
    #[display("maced")]
    Maced,
    /// Fully enciphered communication
    #[display("enciphered")]
    Enciphered,
}

impl CommMode {
    /// Wire byte of this mode
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Plain => 0x00,
            Self::Maced => 0x01,
            Self::Enciphered => 0x03,
        }
    }

    /// Decode a communication mode byte
    ///
    /// Only the two low bits are significant; `0x02` also means plain.
    pub const fn from_byte(byte: u8) -> Self {
        match byte & 0x03 {
            0x01 => Self::Maced,
            0x03 => Self::Enciphered,
            _ => Self::Plain,
        }
    }
}

/// Access rights of a file: four key references packed into two bytes
///
/// Each nibble names a key slot, `0xE` grants free access and `0xF` denies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessRights {
    /// Key required for reading
    pub read: u8,
    /// Key required for writing
    pub write: u8,
    /// Key required for reading and writing
    pub read_write: u8,
    /// Key required to change these settings
    pub change: u8,
}

impl AccessRights {
    /// Free access for every operation
    pub const FREE: Self = Self::uniform(0xE);

    /// Key number meaning "free access"
    pub const FREE_KEY: u8 = 0xE;

    /// Key number meaning "never allowed"
    pub const DENY_KEY: u8 = 0xF;

    /// Create access rights from four key references
    pub const fn new(read: u8, write: u8, read_write: u8, change: u8) -> Self {
        Self {
            read: read & 0x0F,
            write: write & 0x0F,
            read_write: read_write & 0x0F,
            change: change & 0x0F,
        }
    }

    /// Use the same key reference for every operation
    pub const fn uniform(key: u8) -> Self {
        Self::new(key, key, key, key)
    }

    /// Decode the wire representation
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self {
            read_write: bytes[0] >> 4,
            change: bytes[0] & 0x0F,
            read: bytes[1] >> 4,
            write: bytes[1] & 0x0F,
        }
    }

    /// Encode into the wire representation
    pub const fn to_bytes(self) -> [u8; 2] {
        [
            (self.read_write << 4) | self.change,
            (self.read << 4) | self.write,
        ]
    }
}

impl Default for AccessRights {
    fn default() -> Self {
        Self::FREE
    }
}

/// Key settings byte of an application or the PICC
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Deref)]
#[display("{_0:#04x}")]
pub struct KeySettings(u8);

impl KeySettings {
    /// Everything changeable with the master key, free directory access
    pub const DEFAULT: Self = Self(0x0F);

    /// Wrap a raw settings byte
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    /// Raw settings byte
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Whether the master key itself may be changed
    pub const fn master_key_changeable(self) -> bool {
        self.0 & 0x01 != 0
    }

    /// Whether listing does not require master key authentication
    pub const fn free_directory_access(self) -> bool {
        self.0 & 0x02 != 0
    }

    /// Whether creating and deleting does not require master key authentication
    pub const fn free_create_delete(self) -> bool {
        self.0 & 0x04 != 0
    }

    /// Whether the settings themselves may still be changed
    pub const fn configuration_changeable(self) -> bool {
        self.0 & 0x08 != 0
    }
}

impl Default for KeySettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Reply to GET KEY SETTINGS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySettingsInfo {
    /// Current key settings
    pub settings: KeySettings,
    /// Number of keys the application was created with
    pub max_keys: u8,
}

/// Result of a create operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateOutcome {
    /// A new application or file was created
    Created,
    /// An application or file with that id already exists (91 DE)
    AlreadyExists,
}

impl CreateOutcome {
    /// Check if the card created something new
    pub const fn is_created(self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Parameters of a value file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueFileConfig {
    /// Lowest balance the card accepts
    pub lower_limit: i32,
    /// Highest balance the card accepts
    pub upper_limit: i32,
    /// Balance after creation
    pub initial_value: i32,
    /// Whether LIMITED CREDIT is enabled
    pub limited_credit: bool,
}

impl ValueFileConfig {
    /// Create a value file configuration with limited credit disabled
    pub const fn new(lower_limit: i32, upper_limit: i32, initial_value: i32) -> Self {
        Self {
            lower_limit,
            upper_limit,
            initial_value,
            limited_credit: false,
        }
    }

    /// Enable or disable LIMITED CREDIT
    pub const fn with_limited_credit(mut self, enabled: bool) -> Self {
        self.limited_credit = enabled;
        self
    }
}

/// Kind of a file
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Standard data file
    #[display("standard")]
    Standard,
    /// Value file
    #[display("value")]
    Value,
    /// Linear record file
    #[display("linear record")]
    LinearRecord,
    /// Cyclic record file
    #[display("cyclic record")]
    CyclicRecord,
}

/// Kind-specific part of a file's settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLayout {
    /// Standard data file
    Standard {
        /// Capacity in bytes
        size: u32,
    },
    /// Value file
    Value {
        /// Lowest accepted balance
        lower_limit: i32,
        /// Highest accepted balance
        upper_limit: i32,
        /// Amount currently available to LIMITED CREDIT
        limited_credit_value: i32,
        /// Whether LIMITED CREDIT is enabled
        limited_credit: bool,
    },
    /// Linear or cyclic record file
    Record {
        /// Whether the file is cyclic
        cyclic: bool,
        /// Size of one record in bytes
        record_size: u32,
        /// Maximum number of records
        max_records: u32,
        /// Records currently stored
        current_records: u32,
    },
}

/// Settings of a file as reported by GET FILE SETTINGS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSettings {
    /// Communication mode
    pub comm_mode: CommMode,
    /// Access rights
    pub access_rights: AccessRights,
    /// Kind-specific settings
    pub layout: FileLayout,
}

impl FileSettings {
    /// Kind of the file
    pub const fn kind(&self) -> FileKind {
        match self.layout {
            FileLayout::Standard { .. } => FileKind::Standard,
            FileLayout::Value { .. } => FileKind::Value,
            FileLayout::Record { cyclic: false, .. } => FileKind::LinearRecord,
            FileLayout::Record { cyclic: true, .. } => FileKind::CyclicRecord,
        }
    }

    /// Decode a GET FILE SETTINGS reply
    pub fn parse(data: &[u8]) -> Result<Self> {
        let [kind, comm, ar0, ar1, rest @ ..] = data else {
            return Err(Error::Protocol("file settings too short"));
        };

        let comm_mode = CommMode::from_byte(*comm);
        let access_rights = AccessRights::from_bytes([*ar0, *ar1]);

        let layout = match *kind {
            file_type::STANDARD => {
                expect_len(rest, 3)?;
                FileLayout::Standard {
                    size: read_u24(rest)?,
                }
            }
            file_type::VALUE => {
                expect_len(rest, 13)?;
                FileLayout::Value {
                    lower_limit: read_i32(rest)?,
                    upper_limit: read_i32(&rest[4..])?,
                    limited_credit_value: read_i32(&rest[8..])?,
                    limited_credit: rest[12] & 0x01 != 0,
                }
            }
            file_type::LINEAR_RECORD | file_type::CYCLIC_RECORD => {
                expect_len(rest, 9)?;
                FileLayout::Record {
                    cyclic: *kind == file_type::CYCLIC_RECORD,
                    record_size: read_u24(rest)?,
                    max_records: read_u24(&rest[3..])?,
                    current_records: read_u24(&rest[6..])?,
                }
            }
            file_type::BACKUP => return Err(Error::Protocol("backup data files are not supported")),
            _ => return Err(Error::Protocol("unknown file type")),
        };

        Ok(Self {
            comm_mode,
            access_rights,
            layout,
        })
    }
}

fn expect_len(data: &[u8], len: usize) -> Result<()> {
    if data.len() != len {
        return Err(Error::Protocol("unexpected file settings length"));
    }
    Ok(())
}

/// Hardware or software part of a GET VERSION reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    /// Vendor id (0x04 for NXP)
    pub vendor_id: u8,
    /// Product type
    pub kind: u8,
    /// Product subtype
    pub subtype: u8,
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Storage size code
    pub storage_size: u8,
    /// Communication protocol type
    pub protocol: u8,
}

impl VersionInfo {
    const LEN: usize = 7;

    const fn from_bytes(b: &[u8; Self::LEN]) -> Self {
        Self {
            vendor_id: b[0],
            kind: b[1],
            subtype: b[2],
            major: b[3],
            minor: b[4],
            storage_size: b[5],
            protocol: b[6],
        }
    }

    /// Storage size in bytes, rounded down when the code marks it as approximate
    ///
    /// Returns `None` for codes describing more than `u32::MAX` bytes.
    pub const fn storage_bytes(&self) -> Option<u32> {
        1u32.checked_shl((self.storage_size >> 1) as u32)
    }
}

/// Manufacturing data returned by GET VERSION
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    /// Hardware information
    pub hardware: VersionInfo,
    /// Software information
    pub software: VersionInfo,
    /// 7-byte unique identifier
    pub uid: [u8; 7],
    /// Production batch number
    pub batch: [u8; 5],
    /// Calendar week of production (BCD)
    pub production_week: u8,
    /// Year of production (BCD)
    pub production_year: u8,
}

impl Version {
    /// Length of a complete three-frame reply
    pub const LEN: usize = 28;

    /// Decode the concatenated three-frame reply
    pub fn parse(data: &[u8]) -> Result<Self> {
        let data: &[u8; Self::LEN] = data
            .try_into()
            .map_err(|_| Error::Protocol("version reply must be 28 bytes"))?;

        let mut hardware = [0u8; VersionInfo::LEN];
        let mut software = [0u8; VersionInfo::LEN];
        let mut uid = [0u8; 7];
        let mut batch = [0u8; 5];
        hardware.copy_from_slice(&data[0..7]);
        software.copy_from_slice(&data[7..14]);
        uid.copy_from_slice(&data[14..21]);
        batch.copy_from_slice(&data[21..26]);

        Ok(Self {
            hardware: VersionInfo::from_bytes(&hardware),
            software: VersionInfo::from_bytes(&software),
            uid,
            batch,
            production_week: data[26],
            production_year: data[27],
        })
    }
}
