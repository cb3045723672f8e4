//! Encryption-at-rest engine for patient documents.
//!
//! A single process-wide 256-bit key is provisioned at startup and handed to a
//! [`CipherBox`]. Every encryption draws a fresh 16-byte nonce from the OS and
//! produces a detached authentication tag. The [`Cipher`] trait allows swapping
//! the AEAD backend; the default is AES-256-GCM.

pub mod aes256gcm;
pub mod cipher_box;
pub mod error;
pub mod key;
pub mod traits;

pub use {
    aes256gcm::{AesGcmCipher, NONCE_LEN, TAG_LEN},
    cipher_box::CipherBox,
    error::CryptoError,
    key::{EncryptionKey, KEY_LEN},
    traits::{Cipher, SealedBox},
};
