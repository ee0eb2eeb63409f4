//! Error handling for key generation

use thiserror::Error;

/// Key generation errors
#[derive(Debug, Error)]
pub enum KeyError {
    /// The operating-system entropy source could not be read
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// Entropy source produced output that failed a health test
    #[error("Insufficient entropy: {0}")]
    InsufficientEntropy(String),

    /// Encoded key material could not be decoded
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),
}

/// Result type for key operations
pub type Result<T> = std::result::Result<T, KeyError>;
