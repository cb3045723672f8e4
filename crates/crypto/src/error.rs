//! Cipher error types.

/// Errors produced by the encryption engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// The key is not exactly the length the cipher requires.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    /// The nonce is not exactly the length the cipher requires.
    #[error("invalid nonce length: expected {expected} bytes, got {got}")]
    InvalidNonceLength { expected: usize, got: usize },

    /// Tag verification failed: the data was tampered with or the key is wrong.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Input does not have the shape the cipher expects.
    #[error("corrupt ciphertext: {0}")]
    CorruptCiphertext(String),

    /// The OS randomness source could not be read.
    #[error("entropy unavailable: {0}")]
    EntropyUnavailable(String),

    /// The data was sealed by a cipher this build does not know.
    #[error("unsupported cipher version: {0:#04x}")]
    UnsupportedCipherVersion(u8),

    /// Key material could not be decoded.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(#[from] base64::DecodeError),
}
