//! PDF encryption according to ISO 32000-1 §7.6
//!
//! The standard security handler supports RC4 40-bit (V1/R2), RC4 128-bit
//! (V2/R3), AES-128 (V4/R4) and AES-256 (V5/R5, Adobe extension level 3).
//! The algorithm is chosen from the document's PDF version.

pub mod aes;
mod encryption_dict;
pub mod key_derivation;
mod password;
mod permissions;
mod rc4;
mod standard_security;

pub use encryption_dict::{
    CryptFilter, CryptFilterMethod, EncryptionDictionary, STANDARD_CRYPT_FILTER,
};
pub use password::{pad_password, process_password_r5, PADDING};
pub use permissions::{PermissionFlags, Permissions, PrintingPermission};
pub use rc4::{rc4, Rc4};
pub use standard_security::{
    compute_file_identifier, Algorithm, CipherKind, ObjectCipher, SecurityConfig,
    SecurityHandler,
};
