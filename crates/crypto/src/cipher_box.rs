//! Key-holding wrapper around a [`Cipher`].

use crate::{
    aes256gcm::AesGcmCipher,
    error::CryptoError,
    key::EncryptionKey,
    traits::{Cipher, SealedBox},
};

/// Stateless encryption engine bound to the process key.
///
/// Generic over [`Cipher`] but defaults to [`AesGcmCipher`]. The key is set at
/// construction and never changes, so a `CipherBox` can be shared across
/// concurrent requests behind an `Arc` without locking.
pub struct CipherBox<C: Cipher = AesGcmCipher> {
    cipher: C,
    key: EncryptionKey,
}

impl CipherBox<AesGcmCipher> {
    /// Create a cipher box with the default AES-256-GCM cipher.
    pub fn new(key: EncryptionKey) -> Self {
        Self::with_cipher(key, AesGcmCipher)
    }
}

impl<C: Cipher> CipherBox<C> {
    pub fn with_cipher(key: EncryptionKey, cipher: C) -> Self {
        Self { cipher, key }
    }

    /// Version tag of the underlying cipher, persisted with each record.
    pub fn version_tag(&self) -> u8 {
        self.cipher.version_tag()
    }

    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<SealedBox, CryptoError> {
        self.cipher.encrypt(self.key.as_bytes(), plaintext, aad)
    }

    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        self.cipher
            .decrypt(self.key.as_bytes(), ciphertext, nonce, tag, aad)
    }

    /// Decrypt a record written by the cipher with `version`.
    ///
    /// Fails with [`CryptoError::UnsupportedCipherVersion`] before touching the
    /// ciphertext if `version` does not match this box's cipher.
    pub fn decrypt_versioned(
        &self,
        version: u8,
        sealed: &SealedBox,
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if version != self.cipher.version_tag() {
            return Err(CryptoError::UnsupportedCipherVersion(version));
        }
        self.decrypt(&sealed.ciphertext, &sealed.nonce, &sealed.tag, aad)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, std::sync::Arc};

    fn cipher_box(byte: u8) -> CipherBox {
        CipherBox::new(EncryptionKey::from_bytes(&[byte; 32]).unwrap())
    }

    #[test]
    fn round_trip() {
        let cb = cipher_box(1);
        let sealed = cb.encrypt(b"MRI findings", b"document:7").unwrap();
        let opened = cb
            .decrypt(&sealed.ciphertext, &sealed.nonce, &sealed.tag, b"document:7")
            .unwrap();
        assert_eq!(opened, b"MRI findings");
    }

    #[test]
    fn other_key_is_rejected() {
        let sealed = cipher_box(1).encrypt(b"MRI findings", b"").unwrap();
        let result = cipher_box(2).decrypt(&sealed.ciphertext, &sealed.nonce, &sealed.tag, b"");
        assert_eq!(result, Err(CryptoError::AuthenticationFailed));
    }

    #[test]
    fn versioned_decrypt_checks_tag_first() {
        let cb = cipher_box(1);
        let sealed = cb.encrypt(b"data", b"").unwrap();

        assert_eq!(cb.decrypt_versioned(cb.version_tag(), &sealed, b"").unwrap(), b"data");
        assert_eq!(
            cb.decrypt_versioned(0x7f, &sealed, b""),
            Err(CryptoError::UnsupportedCipherVersion(0x7f))
        );
    }

    #[test]
    fn shared_across_threads() {
        let cb = Arc::new(cipher_box(3));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cb = Arc::clone(&cb);
                std::thread::spawn(move || {
                    let msg = format!("record {i}");
                    let sealed = cb.encrypt(msg.as_bytes(), b"").unwrap();
                    let opened = cb
                        .decrypt(&sealed.ciphertext, &sealed.nonce, &sealed.tag, b"")
                        .unwrap();
                    assert_eq!(opened, msg.as_bytes());
                    sealed.nonce
                })
            })
            .collect();

        let mut nonces: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        nonces.sort();
        nonces.dedup();
        assert_eq!(nonces.len(), 8);
    }
}
