//! AES-256-GCM implementation of the [`Cipher`] trait.

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use aes_gcm::{
    AesGcm,
    aead::{AeadInPlace, KeyInit, consts::U16, generic_array::GenericArray},
    aes::Aes256,
};
use {
    rand::{TryRngCore, rngs::OsRng},
    zeroize::Zeroizing,
};

use crate::{
    error::CryptoError,
    key::KEY_LEN,
    traits::{Cipher, SealedBox},
};

/// Version tag for the AES-256-GCM cipher.
pub const VERSION_TAG: u8 = 0x01;

/// Nonce size (128 bits).
pub const NONCE_LEN: usize = 16;

/// GCM authentication tag size.
pub const TAG_LEN: usize = 16;

/// AES-256 in GCM mode with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// AES-256-GCM AEAD cipher.
///
/// Ciphertext has the same length as the plaintext; the 16-byte tag and the
/// 16-byte nonce are returned separately in the [`SealedBox`].
pub struct AesGcmCipher;

fn new_cipher(key: &[u8]) -> Result<Aes256Gcm16, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            got: key.len(),
        });
    }
    Aes256Gcm16::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_LEN,
        got: key.len(),
    })
}

fn generate_nonce() -> Result<[u8; NONCE_LEN], CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.try_fill_bytes(&mut nonce).map_err(|e| {
        #[cfg(feature = "tracing")]
        tracing::error!(error = %e, "OS randomness source unavailable, refusing to encrypt");
        CryptoError::EntropyUnavailable(e.to_string())
    })?;
    Ok(nonce)
}

impl Cipher for AesGcmCipher {
    fn version_tag(&self) -> u8 {
        VERSION_TAG
    }

    #[allow(deprecated)]
    fn encrypt(
        &self,
        key: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<SealedBox, CryptoError> {
        let cipher = new_cipher(key)?;
        let nonce = generate_nonce()?;

        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(GenericArray::from_slice(&nonce), aad, &mut buffer)
            .map_err(|_| CryptoError::CorruptCiphertext("plaintext exceeds GCM limits".into()))?;

        Ok(SealedBox {
            ciphertext: buffer,
            nonce: nonce.to_vec(),
            tag: tag.to_vec(),
        })
    }

    #[allow(deprecated)]
    fn decrypt(
        &self,
        key: &[u8],
        ciphertext: &[u8],
        nonce: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = new_cipher(key)?;

        if nonce.len() != NONCE_LEN {
            return Err(CryptoError::InvalidNonceLength {
                expected: NONCE_LEN,
                got: nonce.len(),
            });
        }
        if tag.len() != TAG_LEN {
            return Err(CryptoError::CorruptCiphertext(format!(
                "authentication tag must be {TAG_LEN} bytes, got {}",
                tag.len()
            )));
        }

        // Buffer is wiped if verification fails.
        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(nonce),
                aad,
                buffer.as_mut_slice(),
                GenericArray::from_slice(tag),
            )
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        Ok(std::mem::take(&mut *buffer))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, std::collections::HashSet};

    const KEY: [u8; 32] = [0x42; 32];

    #[test]
    fn round_trip_no_aad() {
        let cipher = AesGcmCipher;
        let plaintext = b"hello vault";

        let sealed = cipher.encrypt(&KEY, plaintext, b"").unwrap();
        let opened = cipher
            .decrypt(&KEY, &sealed.ciphertext, &sealed.nonce, &sealed.tag, b"")
            .unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn round_trip_with_aad() {
        let cipher = AesGcmCipher;
        let aad = b"document:1";

        let sealed = cipher.encrypt(&KEY, b"lab result", aad).unwrap();
        let opened = cipher
            .decrypt(&KEY, &sealed.ciphertext, &sealed.nonce, &sealed.tag, aad)
            .unwrap();
        assert_eq!(opened, b"lab result");
    }

    #[test]
    fn output_shape() {
        let cipher = AesGcmCipher;
        let plaintext = vec![7u8; 1234];

        let sealed = cipher.encrypt(&KEY, &plaintext, b"").unwrap();
        assert_eq!(sealed.ciphertext.len(), plaintext.len());
        assert_eq!(sealed.nonce.len(), NONCE_LEN);
        assert_eq!(sealed.tag.len(), TAG_LEN);
        assert_ne!(sealed.ciphertext, plaintext);
    }

    #[test]
    fn wrong_key_fails() {
        let cipher = AesGcmCipher;
        let other = [0x43u8; 32];

        let sealed = cipher.encrypt(&KEY, b"secret", b"").unwrap();
        let result = cipher.decrypt(&other, &sealed.ciphertext, &sealed.nonce, &sealed.tag, b"");
        assert_eq!(result, Err(CryptoError::AuthenticationFailed));
    }

    #[test]
    fn wrong_aad_fails() {
        let cipher = AesGcmCipher;

        let sealed = cipher.encrypt(&KEY, b"secret", b"document:1").unwrap();
        let result = cipher.decrypt(
            &KEY,
            &sealed.ciphertext,
            &sealed.nonce,
            &sealed.tag,
            b"document:2",
        );
        assert_eq!(result, Err(CryptoError::AuthenticationFailed));
    }

    #[test]
    fn every_bit_flip_is_detected() {
        let cipher = AesGcmCipher;
        let sealed = cipher.encrypt(&KEY, b"potassium 4.1 mmol/L", b"").unwrap();

        for part in 0..3 {
            let len = match part {
                0 => sealed.ciphertext.len(),
                1 => sealed.nonce.len(),
                _ => sealed.tag.len(),
            };
            for byte in 0..len {
                for bit in 0..8 {
                    let mut tampered = sealed.clone();
                    let target = match part {
                        0 => &mut tampered.ciphertext,
                        1 => &mut tampered.nonce,
                        _ => &mut tampered.tag,
                    };
                    target[byte] ^= 1 << bit;

                    let result = cipher.decrypt(
                        &KEY,
                        &tampered.ciphertext,
                        &tampered.nonce,
                        &tampered.tag,
                        b"",
                    );
                    assert_eq!(
                        result,
                        Err(CryptoError::AuthenticationFailed),
                        "part {part} byte {byte} bit {bit}"
                    );
                }
            }
        }
    }

    #[rstest]
    #[case(0)]
    #[case(16)]
    #[case(31)]
    #[case(33)]
    #[case(64)]
    fn encrypt_rejects_bad_key_length(#[case] len: usize) {
        let key = vec![0u8; len];
        let result = AesGcmCipher.encrypt(&key, b"data", b"");
        assert_eq!(result, Err(CryptoError::InvalidKeyLength {
            expected: 32,
            got: len,
        }));
    }

    #[rstest]
    #[case(0)]
    #[case(24)]
    #[case(33)]
    fn decrypt_rejects_bad_key_length(#[case] len: usize) {
        let sealed = AesGcmCipher.encrypt(&KEY, b"data", b"").unwrap();
        let key = vec![0u8; len];
        let result = AesGcmCipher.decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag, b"");
        assert_eq!(result, Err(CryptoError::InvalidKeyLength {
            expected: 32,
            got: len,
        }));
    }

    #[rstest]
    #[case(0)]
    #[case(12)]
    #[case(24)]
    fn decrypt_rejects_bad_nonce_length(#[case] len: usize) {
        let sealed = AesGcmCipher.encrypt(&KEY, b"data", b"").unwrap();
        let nonce = vec![0u8; len];
        let result = AesGcmCipher.decrypt(&KEY, &sealed.ciphertext, &nonce, &sealed.tag, b"");
        assert_eq!(result, Err(CryptoError::InvalidNonceLength {
            expected: 16,
            got: len,
        }));
    }

    #[test]
    fn truncated_tag_is_corrupt() {
        let sealed = AesGcmCipher.encrypt(&KEY, b"data", b"").unwrap();
        let result =
            AesGcmCipher.decrypt(&KEY, &sealed.ciphertext, &sealed.nonce, &sealed.tag[..8], b"");
        assert!(matches!(result, Err(CryptoError::CorruptCiphertext(_))));
    }

    #[test]
    fn nonces_do_not_repeat() {
        let cipher = AesGcmCipher;
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let sealed = cipher.encrypt(&KEY, b"same input", b"").unwrap();
            assert!(seen.insert(sealed.nonce), "nonce reused");
        }
    }

    #[test]
    fn same_input_produces_different_ciphertexts() {
        let cipher = AesGcmCipher;
        let a = cipher.encrypt(&KEY, b"same input", b"").unwrap();
        let b = cipher.encrypt(&KEY, b"same input", b"").unwrap();
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_ne!(a.tag, b.tag);
    }

    #[test]
    fn version_tag_is_0x01() {
        assert_eq!(AesGcmCipher.version_tag(), 0x01);
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let sealed = AesGcmCipher.encrypt(&KEY, b"", b"").unwrap();
        assert!(sealed.ciphertext.is_empty());
        let opened = AesGcmCipher
            .decrypt(&KEY, &sealed.ciphertext, &sealed.nonce, &sealed.tag, b"")
            .unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn large_plaintext_round_trip() {
        let plaintext: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let sealed = AesGcmCipher.encrypt(&KEY, &plaintext, b"").unwrap();
        let opened = AesGcmCipher
            .decrypt(&KEY, &sealed.ciphertext, &sealed.nonce, &sealed.tag, b"")
            .unwrap();
        assert_eq!(opened, plaintext);
    }
}
