//! Little-endian integer codecs for DESFire wire fields
//!
//! Sizes, offsets and record counts travel as 3-byte little-endian unsigned
//! integers. Value-file amounts and limits are 4-byte little-endian two's
//! complement.

use crate::{Error, Result};

/// Largest value representable in a 3-byte field
pub const U24_MAX: u32 = 0x00FF_FFFF;

/// Encode a value into a 3-byte little-endian field
///
/// # Errors
/// Returns [`Error::ValueOutOfRange`] if `value` exceeds [`U24_MAX`].
pub fn encode_u24(value: u32) -> Result<[u8; 3]> {
    if value > U24_MAX {
        return Err(Error::ValueOutOfRange {
            value: value as u64,
            width: 3,
        });
    }
    let [b0, b1, b2, _] = value.to_le_bytes();
    Ok([b0, b1, b2])
}

/// Decode a 3-byte little-endian field
pub const fn decode_u24(bytes: [u8; 3]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

/// Decode a 3-byte little-endian field from the start of a slice
pub fn read_u24(bytes: &[u8]) -> Result<u32> {
    match bytes {
        [b0, b1, b2, ..] => Ok(decode_u24([*b0, *b1, *b2])),
        _ => Err(Error::protocol("truncated 3-byte field")),
    }
}

/// Encode a value into a 4-byte little-endian field
pub const fn encode_u32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Decode a 4-byte little-endian field
pub const fn decode_u32(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Encode a signed amount into a 4-byte little-endian field
pub const fn encode_i32(value: i32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Decode a signed 4-byte little-endian field from the start of a slice
pub fn read_i32(bytes: &[u8]) -> Result<i32> {
    match bytes {
        [b0, b1, b2, b3, ..] => Ok(i32::from_le_bytes([*b0, *b1, *b2, *b3])),
        _ => Err(Error::protocol("truncated 4-byte field")),
    }
}
