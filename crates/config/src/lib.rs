//! Configuration loading, env substitution, overrides and key provisioning.
//!
//! Config files: `carevault.toml`, `carevault.yaml`, or `carevault.json`
//! Searched in `./` then `~/.config/carevault/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in all string
//! values, then `CAREVAULT_*` overrides on top.

pub mod env_subst;
pub mod error;
pub mod key;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::ConfigError,
    key::resolve_encryption_key,
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config,
    },
    schema::{CarevaultConfig, DatabaseConfig, DocumentsConfig, EncryptionConfig, ServerConfig},
    validate::{Diagnostic, Severity, has_errors, validate, validate_toml_str},
};
