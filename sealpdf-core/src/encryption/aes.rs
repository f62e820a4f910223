//! AES primitives used by the standard security handler.
//!
//! Object payloads use CBC mode with PKCS#7 padding and a 16-byte IV written
//! in front of the ciphertext (ISO 32000-1 §7.6.2). Key wrapping for
//! revision 5 uses CBC without padding and a zero IV; the `Perms` entry uses
//! a single ECB block.

use crate::error::{PdfError, Result};
use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use aes::{Aes128, Aes256};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

pub const BLOCK_SIZE: usize = 16;

/// AES-128-CBC with PKCS#7 padding; returns `iv ‖ ciphertext`.
pub fn aes128_cbc_encrypt(key: &[u8; 16], iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let ciphertext =
        Aes128CbcEnc::new(&(*key).into(), &(*iv).into()).encrypt_padded_vec_mut::<Pkcs7>(data);
    prefix_iv(iv, ciphertext)
}

/// AES-256-CBC with PKCS#7 padding; returns `iv ‖ ciphertext`.
pub fn aes256_cbc_encrypt(key: &[u8; 32], iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let ciphertext =
        Aes256CbcEnc::new(&(*key).into(), &(*iv).into()).encrypt_padded_vec_mut::<Pkcs7>(data);
    prefix_iv(iv, ciphertext)
}

/// Decrypt an IV-prefixed AES-128-CBC payload and strip its padding.
pub fn aes128_cbc_decrypt(key: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    let (iv, ciphertext) = split_iv(data)?;
    Aes128CbcDec::new(&(*key).into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| PdfError::EncryptionError("invalid PKCS#7 padding".to_string()))
}

/// Decrypt an IV-prefixed AES-256-CBC payload and strip its padding.
pub fn aes256_cbc_decrypt(key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>> {
    let (iv, ciphertext) = split_iv(data)?;
    Aes256CbcDec::new(&(*key).into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| PdfError::EncryptionError("invalid PKCS#7 padding".to_string()))
}

/// AES-256-CBC, zero IV, no padding. Wraps a 32-byte file key into `UE`/`OE`.
pub fn aes256_wrap_key(key: &[u8; 32], file_key: &[u8; 32]) -> [u8; 32] {
    let iv = [0u8; BLOCK_SIZE];
    let mut out = [0u8; 32];
    let ciphertext =
        Aes256CbcEnc::new(&(*key).into(), &iv.into()).encrypt_padded_vec_mut::<NoPadding>(file_key);
    out.copy_from_slice(&ciphertext);
    out
}

/// Inverse of [`aes256_wrap_key`].
pub fn aes256_unwrap_key(key: &[u8; 32], wrapped: &[u8; 32]) -> Result<[u8; 32]> {
    let iv = [0u8; BLOCK_SIZE];
    let plain = Aes256CbcDec::new(&(*key).into(), &iv.into())
        .decrypt_padded_vec_mut::<NoPadding>(wrapped)
        .map_err(|_| PdfError::EncryptionError("key unwrap failed".to_string()))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&plain);
    Ok(out)
}

/// Single-block AES-256-ECB encryption.
pub fn aes256_ecb_encrypt_block(key: &[u8; 32], block: &[u8; 16]) -> [u8; 16] {
    let mut out = *block;
    Aes256EcbEnc::new(&(*key).into()).encrypt_block_mut((&mut out[..]).into());
    out
}

pub fn aes256_ecb_decrypt_block(key: &[u8; 32], block: &[u8; 16]) -> [u8; 16] {
    let mut out = *block;
    Aes256EcbDec::new(&(*key).into()).decrypt_block_mut((&mut out[..]).into());
    out
}

fn prefix_iv(iv: &[u8; 16], ciphertext: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&ciphertext);
    out
}

fn split_iv(data: &[u8]) -> Result<([u8; 16], &[u8])> {
    if data.len() < BLOCK_SIZE * 2 || data.len() % BLOCK_SIZE != 0 {
        return Err(PdfError::EncryptionError(format!(
            "AES payload of {} bytes is not an IV followed by whole blocks",
            data.len()
        )));
    }
    let mut iv = [0u8; BLOCK_SIZE];
    iv.copy_from_slice(&data[..BLOCK_SIZE]);
    Ok((iv, &data[BLOCK_SIZE..]))
}
