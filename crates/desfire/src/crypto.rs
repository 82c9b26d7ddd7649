//! Single-DES CBC primitives used by the authentication handshake
//!
//! Input that is not a whole number of blocks is zero padded before
//! encryption. Decryption requires block-aligned input.

use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, generic_array::GenericArray};

use crate::constants::BLOCK_LEN;
use crate::keys::DesKey;
use crate::{Error, Result};

/// One DES block
pub type Block = [u8; BLOCK_LEN];

type DesCbcEnc = cbc::Encryptor<des::Des>;
type DesCbcDec = cbc::Decryptor<des::Des>;

/// The all-zero initialization vector
pub const ZERO_IV: Block = [0u8; BLOCK_LEN];

/// Encrypt `data` with DES in CBC mode, zero padding the final block
pub fn cbc_encrypt(key: &DesKey, iv: &Block, data: &[u8]) -> Vec<u8> {
    let mut buffer = data.to_vec();
    buffer.resize(data.len().div_ceil(BLOCK_LEN) * BLOCK_LEN, 0);

    let mut encryptor = DesCbcEnc::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(iv),
    );
    for block in buffer.chunks_exact_mut(BLOCK_LEN) {
        encryptor.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    buffer
}

/// Decrypt block-aligned `data` with DES in CBC mode
pub fn cbc_decrypt(key: &DesKey, iv: &Block, data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % BLOCK_LEN != 0 {
        return Err(Error::Protocol("ciphertext is not block aligned"));
    }

    let mut buffer = data.to_vec();
    let mut decryptor = DesCbcDec::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(iv),
    );
    for block in buffer.chunks_exact_mut(BLOCK_LEN) {
        decryptor.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    Ok(buffer)
}

/// Decrypt a single block
pub fn decrypt_block(key: &DesKey, iv: &Block, block: &Block) -> Block {
    let mut out = *block;
    let mut decryptor = DesCbcDec::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(iv),
    );
    decryptor.decrypt_block_mut(GenericArray::from_mut_slice(&mut out));
    out
}

/// Rotate a block left by `n` bytes
///
/// Byte 0 moves to the end for `n = 1`.
pub const fn rotate_left(block: &Block, n: usize) -> Block {
    let mut out = [0u8; BLOCK_LEN];
    let mut i = 0;
    while i < BLOCK_LEN {
        out[i] = block[(i + n) % BLOCK_LEN];
        i += 1;
    }
    out
}
