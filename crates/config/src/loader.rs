use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, error::ConfigError, schema::CarevaultConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "carevault.toml",
    "carevault.yaml",
    "carevault.yml",
    "carevault.json",
];

/// Environment variables that override file values after loading.
pub const ENV_ENCRYPTION_KEY: &str = "CAREVAULT_ENCRYPTION_KEY";
pub const ENV_DATABASE_URL: &str = "CAREVAULT_DATABASE_URL";
pub const ENV_BIND: &str = "CAREVAULT_BIND";
pub const ENV_PORT: &str = "CAREVAULT_PORT";
pub const ENV_MAX_DOCUMENT_BYTES: &str = "CAREVAULT_MAX_DOCUMENT_BYTES";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<CarevaultConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./carevault.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/carevault/carevault.{toml,yaml,yml,json}` (user-global)
///
/// Returns `CarevaultConfig::default()` if no config file is found. A file
/// that exists but fails to parse is an error.
pub fn discover_and_load() -> anyhow::Result<CarevaultConfig> {
    match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)
        },
        None => {
            debug!("no config file found, using defaults");
            Ok(CarevaultConfig::default())
        },
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/carevault/
    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/carevault/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "carevault").map(|d| d.config_dir().to_path_buf())
}

/// Apply `CAREVAULT_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: CarevaultConfig) -> Result<CarevaultConfig, ConfigError> {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

pub(crate) fn apply_env_overrides_with(
    mut config: CarevaultConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<CarevaultConfig, ConfigError> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(ENV_ENCRYPTION_KEY) {
        if config.encryption.key.is_some() {
            warn!("{ENV_ENCRYPTION_KEY} overrides the key from the config file");
        }
        config.encryption.key = Some(Secret::new(key));
    }
    if let Some(url) = get(ENV_DATABASE_URL) {
        config.database.url = url;
    }
    if let Some(bind) = get(ENV_BIND) {
        config.server.bind = bind;
    }
    if let Some(port) = get(ENV_PORT) {
        config.server.port = port.trim().parse().map_err(|e| ConfigError::InvalidOverride {
            var: ENV_PORT,
            reason: format!("{e}"),
        })?;
    }
    if let Some(limit) = get(ENV_MAX_DOCUMENT_BYTES) {
        config.documents.max_document_bytes =
            limit
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidOverride {
                    var: ENV_MAX_DOCUMENT_BYTES,
                    reason: format!("{e}"),
                })?;
    }

    Ok(config)
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<CarevaultConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
