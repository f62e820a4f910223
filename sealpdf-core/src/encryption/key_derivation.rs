//! Key and entry derivation for the standard security handler.
//!
//! Revisions 2-4 follow Algorithms 2, 3, 4 and 5 of ISO 32000-1 §7.6.3.
//! Revision 5 uses the single SHA-256 pass of the Adobe extension level 3
//! handler, without the iterated hash introduced by revision 6.

use crate::encryption::aes::{aes256_ecb_encrypt_block, aes256_wrap_key};
use crate::encryption::password::PADDING;
use crate::encryption::rc4::rc4;
use sha2::{Digest, Sha256};

/// Additional rehashes applied from revision 3 on.
const MD5_ROUNDS: usize = 50;
/// RC4 passes with XOR-modified keys, after the first, from revision 3 on.
const RC4_ROUNDS: u8 = 19;

/// Salt appended to the object key input for AES-128 (Algorithm 1, step b).
const AES_SALT: &[u8; 4] = b"sAlT";

fn md5(data: &[u8]) -> [u8; 16] {
    md5::compute(data).0
}

fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn xor_key(key: &[u8], round: u8) -> Vec<u8> {
    key.iter().map(|b| b ^ round).collect()
}

/// RC4 key used to produce the `O` entry (Algorithm 3, steps a-d).
pub fn compute_owner_key(owner_padded: &[u8; 32], revision: u8, key_len: usize) -> Vec<u8> {
    let mut hash = md5(owner_padded);
    if revision >= 3 {
        for _ in 0..MD5_ROUNDS {
            hash = md5(&hash);
        }
    }
    hash[..key_len].to_vec()
}

/// `O` entry for revisions 2-4 (Algorithm 3).
pub fn compute_owner_entry(
    owner_padded: &[u8; 32],
    user_padded: &[u8; 32],
    revision: u8,
    key_len: usize,
) -> [u8; 32] {
    let key = compute_owner_key(owner_padded, revision, key_len);
    let mut result = rc4(&key, user_padded);

    if revision >= 3 {
        for round in 1..=RC4_ROUNDS {
            result = rc4(&xor_key(&key, round), &result);
        }
    }

    let mut entry = [0u8; 32];
    entry.copy_from_slice(&result);
    entry
}

/// File encryption key for revisions 2-4 (Algorithm 2).
pub fn compute_file_key(
    user_padded: &[u8; 32],
    owner_entry: &[u8],
    permissions: i32,
    file_id: &[u8],
    revision: u8,
    key_len: usize,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(32 + owner_entry.len() + 4 + file_id.len());
    data.extend_from_slice(user_padded);
    data.extend_from_slice(owner_entry);
    data.extend_from_slice(&permissions.to_le_bytes());
    data.extend_from_slice(file_id);

    let mut hash = md5(&data);
    if revision >= 3 {
        for _ in 0..MD5_ROUNDS {
            hash = md5(&hash[..key_len]);
        }
    }
    hash[..key_len].to_vec()
}

/// `U` entry for revisions 2-4 (Algorithms 4 and 5).
///
/// From revision 3 on only the first 16 bytes are significant; the rest are
/// zero filled.
pub fn compute_user_entry(file_key: &[u8], file_id: &[u8], revision: u8) -> [u8; 32] {
    let mut entry = [0u8; 32];

    if revision == 2 {
        entry.copy_from_slice(&rc4(file_key, &PADDING));
        return entry;
    }

    let mut data = Vec::with_capacity(32 + file_id.len());
    data.extend_from_slice(&PADDING);
    data.extend_from_slice(file_id);

    let mut result = rc4(file_key, &md5(&data));
    for round in 1..=RC4_ROUNDS {
        result = rc4(&xor_key(file_key, round), &result);
    }

    entry[..16].copy_from_slice(&result);
    entry
}

/// `U` entry for revision 5: `SHA-256(password ‖ validation salt) ‖ validation salt ‖ key salt`.
pub fn compute_user_entry_r5(
    password: &[u8],
    validation_salt: &[u8; 8],
    key_salt: &[u8; 8],
) -> [u8; 48] {
    salted_entry(sha256(&[password, &validation_salt[..]]), validation_salt, key_salt)
}

/// `O` entry for revision 5; the hash also covers the complete `U` entry.
pub fn compute_owner_entry_r5(
    password: &[u8],
    validation_salt: &[u8; 8],
    key_salt: &[u8; 8],
    user_entry: &[u8; 48],
) -> [u8; 48] {
    salted_entry(
        sha256(&[password, &validation_salt[..], &user_entry[..]]),
        validation_salt,
        key_salt,
    )
}

fn salted_entry(hash: [u8; 32], validation_salt: &[u8; 8], key_salt: &[u8; 8]) -> [u8; 48] {
    let mut entry = [0u8; 48];
    entry[..32].copy_from_slice(&hash);
    entry[32..40].copy_from_slice(validation_salt);
    entry[40..].copy_from_slice(key_salt);
    entry
}

/// `UE` entry: the file key wrapped under `SHA-256(password ‖ key salt)`.
pub fn compute_user_key_entry_r5(
    password: &[u8],
    key_salt: &[u8; 8],
    file_key: &[u8; 32],
) -> [u8; 32] {
    aes256_wrap_key(&sha256(&[password, &key_salt[..]]), file_key)
}

/// `OE` entry: the file key wrapped under `SHA-256(password ‖ key salt ‖ U)`.
pub fn compute_owner_key_entry_r5(
    password: &[u8],
    key_salt: &[u8; 8],
    user_entry: &[u8; 48],
    file_key: &[u8; 32],
) -> [u8; 32] {
    aes256_wrap_key(&sha256(&[password, &key_salt[..], &user_entry[..]]), file_key)
}

/// `Perms` entry: `P ‖ FF FF FF FF ‖ "Tadb" ‖ 4 random bytes`, one ECB block.
pub fn compute_perms_entry(permissions: i32, file_key: &[u8; 32], random: [u8; 4]) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[..4].copy_from_slice(&permissions.to_le_bytes());
    block[4..8].copy_from_slice(&[0xFF; 4]);
    block[8..12].copy_from_slice(b"Tadb");
    block[12..].copy_from_slice(&random);
    aes256_ecb_encrypt_block(file_key, &block)
}

/// Per-object key for RC4 and AES-128 (Algorithm 1).
///
/// The input is the file key followed by the low three bytes of the object
/// number and the low two bytes of the generation, little-endian.
pub fn compute_object_key(file_key: &[u8], number: u32, generation: u16, aes: bool) -> Vec<u8> {
    let mut data = Vec::with_capacity(file_key.len() + 9);
    data.extend_from_slice(file_key);
    data.extend_from_slice(&number.to_le_bytes()[..3]);
    data.extend_from_slice(&generation.to_le_bytes());
    if aes {
        data.extend_from_slice(AES_SALT);
    }

    let hash = md5(&data);
    let len = (file_key.len() + 5).min(16);
    hash[..len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::aes::aes256_ecb_decrypt_block;
    use crate::encryption::password::pad_password;

    const FILE_ID: [u8; 16] = [
        0x6F, 0x2A, 0x01, 0x9B, 0x44, 0x10, 0xC3, 0x7E, 0x5D, 0x88, 0x21, 0xF0, 0x0A, 0xB4, 0x39,
        0x72,
    ];

    #[test]
    fn test_owner_entry_decrypts_to_padded_user_password() {
        let owner = pad_password("owner").unwrap();
        let user = pad_password("user").unwrap();

        for (revision, key_len) in [(2u8, 5usize), (3, 16), (4, 16)] {
            let entry = compute_owner_entry(&owner, &user, revision, key_len);
            let key = compute_owner_key(&owner, revision, key_len);

            let mut data = entry.to_vec();
            let last_round = if revision >= 3 { RC4_ROUNDS } else { 0 };
            for round in (0..=last_round).rev() {
                data = rc4(&xor_key(&key, round), &data);
            }
            assert_eq!(data, user, "revision {revision}");
        }
    }

    #[test]
    fn test_user_entry_r2_checks_file_key() {
        let owner = pad_password("owner").unwrap();
        let user = pad_password("").unwrap();
        let o = compute_owner_entry(&owner, &user, 2, 5);
        let key = compute_file_key(&user, &o, -4, &FILE_ID, 2, 5);

        assert_eq!(key.len(), 5);
        let u = compute_user_entry(&key, &FILE_ID, 2);
        assert_eq!(rc4(&key, &u), PADDING);
    }

    #[test]
    fn test_user_entry_r3_layout() {
        let user = pad_password("secret").unwrap();
        let o = compute_owner_entry(&user, &user, 3, 16);
        let key = compute_file_key(&user, &o, -3904, &FILE_ID, 3, 16);
        let u = compute_user_entry(&key, &FILE_ID, 3);

        assert_eq!(&u[16..], &[0u8; 16]);

        let mut data = u[..16].to_vec();
        for round in (0..=RC4_ROUNDS).rev() {
            data = rc4(&xor_key(&key, round), &data);
        }
        let mut expected_input = PADDING.to_vec();
        expected_input.extend_from_slice(&FILE_ID);
        assert_eq!(data, md5(&expected_input));
    }

    #[test]
    fn test_file_key_depends_on_every_input() {
        let user = pad_password("u").unwrap();
        let o = [0x11u8; 32];
        let base = compute_file_key(&user, &o, -4, &FILE_ID, 3, 16);

        assert_eq!(base, compute_file_key(&user, &o, -4, &FILE_ID, 3, 16));
        assert_ne!(base, compute_file_key(&user, &o, -8, &FILE_ID, 3, 16));
        assert_ne!(base, compute_file_key(&user, &[0x12; 32], -4, &FILE_ID, 3, 16));
        assert_ne!(base, compute_file_key(&user, &o, -4, &[0u8; 16], 3, 16));
        assert_ne!(base, compute_file_key(&user, &o, -4, &FILE_ID, 2, 16));
    }

    #[test]
    fn test_r5_entries() {
        let vsalt = [1u8; 8];
        let ksalt = [2u8; 8];
        let u = compute_user_entry_r5(b"user", &vsalt, &ksalt);

        assert_eq!(u[..32], sha256(&[&b"user"[..], &vsalt[..]]));
        assert_eq!(&u[32..40], &vsalt);
        assert_eq!(&u[40..], &ksalt);

        let owner_vsalt = [3u8; 8];
        let owner_ksalt = [4u8; 8];
        let o = compute_owner_entry_r5(b"owner", &owner_vsalt, &owner_ksalt, &u);
        assert_eq!(o[..32], sha256(&[&b"owner"[..], &owner_vsalt[..], &u[..]]));
        assert_eq!(o[40..], owner_ksalt);
    }

    #[test]
    fn test_r5_key_entries_unwrap_to_file_key() {
        let file_key = [0x5Au8; 32];
        let ksalt = [9u8; 8];
        let ue = compute_user_key_entry_r5(b"pw", &ksalt, &file_key);

        let kek = sha256(&[&b"pw"[..], &ksalt[..]]);
        let unwrapped = crate::encryption::aes::aes256_unwrap_key(&kek, &ue).unwrap();
        assert_eq!(unwrapped, file_key);
    }

    #[test]
    fn test_perms_entry_layout() {
        let file_key = [0x33u8; 32];
        let perms = compute_perms_entry(-3904, &file_key, [1, 2, 3, 4]);
        let block = aes256_ecb_decrypt_block(&file_key, &perms);

        assert_eq!(&block[..4], &(-3904i32).to_le_bytes());
        assert_eq!(&block[4..8], &[0xFF; 4]);
        assert_eq!(&block[8..12], b"Tadb");
        assert_eq!(&block[12..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_object_key_lengths() {
        assert_eq!(compute_object_key(&[1; 5], 1, 0, false).len(), 10);
        assert_eq!(compute_object_key(&[1; 16], 1, 0, false).len(), 16);
        assert_eq!(compute_object_key(&[1; 16], 1, 0, true).len(), 16);
    }

    #[test]
    fn test_object_key_input() {
        let file_key = [7u8; 5];
        let mut expected = file_key.to_vec();
        expected.extend_from_slice(&[0x34, 0x12, 0x00, 0x02, 0x00]);

        assert_eq!(
            compute_object_key(&file_key, 0x1234, 2, false),
            md5(&expected)[..10].to_vec()
        );

        expected.extend_from_slice(b"sAlT");
        assert_eq!(
            compute_object_key(&file_key, 0x1234, 2, true),
            md5(&expected)[..10].to_vec()
        );
    }
}
