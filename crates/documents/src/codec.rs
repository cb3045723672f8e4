//! Text encoding for binary record fields.
//!
//! Ciphertext, nonce and tag are persisted as standard padded base64 so they
//! survive any TEXT column unchanged. Decoding is strict: non-canonical
//! padding or stray characters are rejected rather than silently repaired.

use base64::Engine;

pub fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(text)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_value_survives() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn empty_is_empty_string() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode("@@not-base64@@").is_err());
    }

    #[test]
    fn rejects_missing_padding() {
        // "AQI=" is the canonical encoding of [1, 2].
        assert!(decode("AQI").is_err());
    }

    #[test]
    fn rejects_embedded_whitespace() {
        assert!(decode("AQ I=").is_err());
    }
}
