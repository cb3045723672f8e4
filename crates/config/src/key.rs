//! Startup-time resolution of the process encryption key.

use {carevault_crypto::EncryptionKey, secrecy::ExposeSecret};

use crate::{error::ConfigError, schema::CarevaultConfig};

/// Decode the configured key.
///
/// Called once at startup; any error here is fatal. A placeholder left
/// unexpanded by env substitution counts as missing.
pub fn resolve_encryption_key(config: &CarevaultConfig) -> Result<EncryptionKey, ConfigError> {
    let raw = config
        .encryption
        .key
        .as_ref()
        .map(|k| k.expose_secret().trim())
        .filter(|k| !k.is_empty() && !k.starts_with("${"))
        .ok_or(ConfigError::MissingEncryptionKey)?;

    EncryptionKey::from_base64(raw).map_err(ConfigError::InvalidEncryptionKey)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, carevault_crypto::CryptoError, secrecy::Secret};

    fn config_with_key(key: Option<&str>) -> CarevaultConfig {
        let mut cfg = CarevaultConfig::default();
        cfg.encryption.key = key.map(|k| Secret::new(k.to_string()));
        cfg
    }

    #[test]
    fn resolves_valid_key() {
        let encoded = EncryptionKey::from_bytes(&[7; 32]).unwrap().to_base64();
        let key = resolve_encryption_key(&config_with_key(Some(encoded.as_str()))).unwrap();
        assert_eq!(key.as_bytes(), &[7; 32]);
    }

    #[test]
    fn missing_key_is_fatal() {
        assert!(matches!(
            resolve_encryption_key(&config_with_key(None)),
            Err(ConfigError::MissingEncryptionKey)
        ));
        assert!(matches!(
            resolve_encryption_key(&config_with_key(Some("   "))),
            Err(ConfigError::MissingEncryptionKey)
        ));
    }

    #[test]
    fn unexpanded_placeholder_is_missing() {
        assert!(matches!(
            resolve_encryption_key(&config_with_key(Some("${CAREVAULT_ENCRYPTION_KEY}"))),
            Err(ConfigError::MissingEncryptionKey)
        ));
    }

    #[test]
    fn short_key_is_rejected() {
        // 16 bytes of base64.
        let result = resolve_encryption_key(&config_with_key(Some("AAAAAAAAAAAAAAAAAAAAAA==")));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEncryptionKey(CryptoError::InvalidKeyLength {
                got: 16,
                ..
            }))
        ));
    }

    #[test]
    fn non_base64_key_is_rejected() {
        assert!(matches!(
            resolve_encryption_key(&config_with_key(Some("hunter2!"))),
            Err(ConfigError::InvalidEncryptionKey(CryptoError::InvalidKeyEncoding(_)))
        ));
    }
}
