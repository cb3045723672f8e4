//! Configuration error types.

use carevault_crypto::CryptoError;

/// Errors that must abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No encryption key was provisioned.
    #[error(
        "no encryption key configured: set CAREVAULT_ENCRYPTION_KEY or [encryption] key (base64, 32 bytes)"
    )]
    MissingEncryptionKey,

    /// The provisioned key is not 32 bytes of base64.
    #[error("invalid encryption key: {0}")]
    InvalidEncryptionKey(#[source] CryptoError),

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {reason}")]
    InvalidOverride { var: &'static str, reason: String },
}
