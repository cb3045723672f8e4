//! Config schema types (server, database, encryption, documents).

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarevaultConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub encryption: EncryptionConfig,
    pub documents: DocumentsConfig,
}

/// HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8787,
        }
    }
}

/// Record store location.
///
/// `url` is a sqlx SQLite URL (`sqlite://carevault.db?mode=rwc`), or
/// `memory` for a non-persistent in-process store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://carevault.db?mode=rwc".into(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

/// Encryption key provisioning.
///
/// Prefer `key = "${CAREVAULT_ENCRYPTION_KEY}"` over an inline literal so the
/// key never sits in a file next to the database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Base64-encoded 32-byte key.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub key: Option<Secret<String>>,
}

/// Upload policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Largest accepted upload in bytes.
    pub max_document_bytes: usize,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 25 * 1024 * 1024,
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

/// Serialized form never carries the key itself.
fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) if !s.expose_secret().is_empty() => serializer.serialize_some("[REDACTED]"),
        _ => serializer.serialize_none(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_sections() {
        let cfg: CarevaultConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.documents.max_document_bytes, 25 * 1024 * 1024);
        assert!(cfg.encryption.key.is_none());
        assert!(!cfg.database.is_memory());
    }

    #[test]
    fn key_is_never_serialized() {
        let cfg: CarevaultConfig =
            toml::from_str("[encryption]\nkey = \"c3VwZXItc2VjcmV0\"\n").unwrap();
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("c3VwZXItc2VjcmV0"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn key_is_redacted_in_debug() {
        let cfg: CarevaultConfig =
            toml::from_str("[encryption]\nkey = \"c3VwZXItc2VjcmV0\"\n").unwrap();
        assert!(!format!("{cfg:?}").contains("c3VwZXItc2VjcmV0"));
    }

    #[test]
    fn memory_database() {
        let cfg: CarevaultConfig = toml::from_str("[database]\nurl = \"MEMORY\"\n").unwrap();
        assert!(cfg.database.is_memory());
    }
}
