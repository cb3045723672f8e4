//! Process-wide encryption key.

use {
    base64::Engine,
    rand::{TryRngCore, rngs::OsRng},
    zeroize::Zeroizing,
};

use crate::error::CryptoError;

/// Key size for AES-256 (32 bytes).
pub const KEY_LEN: usize = 32;

/// A 256-bit secret, zeroed on drop and never printed.
///
/// Provisioned once at startup and moved into a `CipherBox`. Not `Clone`, so
/// the secret exists in exactly one place.
///
/// ```compile_fail
/// let key = carevault_crypto::EncryptionKey::from_bytes(&[0; 32]).unwrap();
/// let _copy = key.clone();
/// ```
pub struct EncryptionKey(Zeroizing<[u8; KEY_LEN]>);

impl EncryptionKey {
    /// Build a key from raw bytes, rejecting anything but exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                got: bytes.len(),
            });
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Decode a standard (padded) base64 key.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            base64::engine::general_purpose::STANDARD.decode(encoded.trim())?,
        );
        Self::from_bytes(&bytes)
    }

    /// Draw a fresh key from the OS randomness source.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        OsRng
            .try_fill_bytes(key.as_mut())
            .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
        Ok(Self(key))
    }

    /// Encode as standard base64, e.g. for writing into a secret manager.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(base64::engine::general_purpose::STANDARD.encode(self.0.as_ref()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}
