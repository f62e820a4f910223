use crate::objects::ObjectId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported encryption algorithm: V={version}, R={revision}")]
    UnsupportedAlgorithm { version: u8, revision: u8 },

    #[error("Password contains an invalid character {character:?} at position {position}")]
    InvalidPasswordCharacter { character: char, position: usize },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Invalid object reference: {0}")]
    InvalidReference(ObjectId),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Invalid PDF version: {0}")]
    InvalidVersion(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
