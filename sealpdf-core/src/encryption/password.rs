//! Password preparation for the standard security handler.

use crate::error::{PdfError, Result};

/// Padding string from Algorithm 2, step a.
pub const PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// Longest UTF-8 password accepted by revision 5.
pub const MAX_R5_PASSWORD_LEN: usize = 127;

/// Latin-1 encode `password`, then pad or truncate it to 32 bytes (revisions 2-4).
///
/// Every character is checked, including those past the 32nd.
pub fn pad_password(password: &str) -> Result<[u8; 32]> {
    let bytes = latin1_bytes(password)?;
    let len = bytes.len().min(32);

    let mut padded = [0u8; 32];
    padded[..len].copy_from_slice(&bytes[..len]);
    padded[len..].copy_from_slice(&PADDING[..32 - len]);

    Ok(padded)
}

/// UTF-8 bytes truncated to 127 (revision 5). No SASLprep normalization.
pub fn process_password_r5(password: &str) -> Vec<u8> {
    let bytes = password.as_bytes();
    bytes[..bytes.len().min(MAX_R5_PASSWORD_LEN)].to_vec()
}

fn latin1_bytes(password: &str) -> Result<Vec<u8>> {
    password
        .chars()
        .enumerate()
        .map(|(position, character)| {
            u8::try_from(u32::from(character))
                .map_err(|_| PdfError::InvalidPasswordCharacter {
                    character,
                    position,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_password() {
        let padded = pad_password("test").unwrap();
        assert_eq!(&padded[..4], b"test");
        assert_eq!(&padded[4..], &PADDING[..28]);
    }

    #[test]
    fn test_pad_empty_password() {
        assert_eq!(pad_password("").unwrap(), PADDING);
    }

    #[test]
    fn test_pad_password_long() {
        let long_password = "a".repeat(40);
        let padded = pad_password(&long_password).unwrap();
        assert_eq!(&padded[..], &long_password.as_bytes()[..32]);
    }

    #[test]
    fn test_pad_password_latin1() {
        let padded = pad_password("caf\u{e9}").unwrap();
        assert_eq!(&padded[..4], &[b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn test_pad_password_rejects_wide_characters() {
        match pad_password("ab\u{20ac}") {
            Err(PdfError::InvalidPasswordCharacter {
                character,
                position,
            }) => {
                assert_eq!(character, '\u{20ac}');
                assert_eq!(position, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        // Characters beyond the truncation point are still validated
        let late = format!("{}\u{4e2d}", "x".repeat(35));
        assert!(pad_password(&late).is_err());
    }

    #[test]
    fn test_process_password_r5() {
        assert_eq!(process_password_r5("p\u{e4}ss"), "p\u{e4}ss".as_bytes());
        assert_eq!(process_password_r5(&"z".repeat(200)).len(), 127);
        assert_eq!(process_password_r5("\u{20ac}"), vec![0xE2, 0x82, 0xAC]);
    }
}
