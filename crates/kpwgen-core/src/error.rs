//! Error types for kpwgen-core

use thiserror::Error;

/// Result type alias for kpwgen operations
pub type Result<T> = std::result::Result<T, KpwgenError>;

/// Input validation failures, surfaced to the user verbatim
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Master key must be at least 8 characters.")]
    SecretTooShort,

    #[error("Platform must not be empty.")]
    EmptyPlatformList,

    #[error("Number of Accounts must match the number of Platforms.")]
    AccountPlatformCountMismatch,
}

/// Errors raised by a derivation primitive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("Platform is empty after normalization")]
    EmptyPlatform,

    #[error("Invalid key material")]
    InvalidKey,

    #[error("Version must be at least 1")]
    InvalidVersion,

    #[error("Target length {length} leaves no room between prefix and suffix (minimum {minimum})")]
    LengthTooShort { length: usize, minimum: usize },

    #[error("Target length {length} exceeds maximum of {maximum}")]
    LengthTooLong { length: usize, maximum: usize },
}

/// Kpwgen error types
#[derive(Error, Debug)]
pub enum KpwgenError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to generate password.")]
    GenerationFailed,

    #[error("History is empty - nothing to export")]
    NothingToExport,

    #[error("Invalid TTL choice: {0}")]
    InvalidTtl(String),

    #[error("Invalid export format: {0}")]
    InvalidFormat(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
