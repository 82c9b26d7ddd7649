//! Key material

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{BLOCK_LEN, MAX_KEY_NO};
use crate::{Error, Result};

/// Single-DES key, wiped from memory on drop
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DesKey([u8; BLOCK_LEN]);

impl DesKey {
    /// Wrap raw key bytes
    pub const fn new(bytes: [u8; BLOCK_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a key from a slice of exactly 8 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; BLOCK_LEN] = bytes
            .try_into()
            .map_err(|_| Error::InvalidArgument("DES keys are 8 bytes"))?;
        Ok(Self(bytes))
    }

    /// Raw key bytes
    pub const fn as_bytes(&self) -> &[u8; BLOCK_LEN] {
        &self.0
    }
}

impl fmt::Debug for DesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DesKey(..)")
    }
}

/// A key slot of the selected application together with the key it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReference {
    key_no: u8,
    key: DesKey,
}

impl KeyReference {
    /// Reference key slot `key_no` holding `key`
    pub fn new(key_no: u8, key: DesKey) -> Result<Self> {
        if key_no > MAX_KEY_NO {
            return Err(Error::InvalidArgument("key number must be 0 to 13"));
        }
        Ok(Self { key_no, key })
    }

    /// The master key slot (0) with the factory all-zero key
    pub fn factory_master() -> Self {
        Self {
            key_no: 0,
            key: DesKey::default(),
        }
    }

    /// Key slot number
    pub const fn key_no(&self) -> u8 {
        self.key_no
    }

    /// Key value
    pub const fn key(&self) -> &DesKey {
        &self.key
    }
}
