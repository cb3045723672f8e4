//! Cipher trait for swappable authenticated encryption backends.

use crate::error::CryptoError;

/// Output of one encryption: ciphertext plus the values needed to open it.
///
/// The nonce is not secret but must be stored next to the ciphertext. The tag
/// is kept detached so each part can be persisted as its own field.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedBox {
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub tag: Vec<u8>,
}

impl std::fmt::Debug for SealedBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedBox")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("nonce_len", &self.nonce.len())
            .field("tag_len", &self.tag.len())
            .finish()
    }
}

/// Trait for authenticated encryption with associated data (AEAD).
///
/// Each implementation has a unique version tag that is persisted with the
/// records it seals, enabling future cipher migrations.
pub trait Cipher: Send + Sync {
    /// Unique identifier for this cipher.
    fn version_tag(&self) -> u8;

    /// Encrypt `plaintext` under `key`, authenticating `aad` alongside it.
    ///
    /// A fresh random nonce is drawn for every call.
    fn encrypt(&self, key: &[u8], plaintext: &[u8], aad: &[u8])
    -> Result<SealedBox, CryptoError>;

    /// Verify the tag and decrypt. No plaintext is released on failure.
    fn decrypt(
        &self,
        key: &[u8],
        ciphertext: &[u8],
        nonce: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;
}
