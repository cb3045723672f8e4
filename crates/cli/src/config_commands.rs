use std::path::{Path, PathBuf};

use anyhow::Result;

use carevault_config::{CarevaultConfig, Diagnostic, Severity, validate, validate_toml_str};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// `carevault check-config`: print diagnostics, exit 1 on any error.
pub fn check(config_path: Option<&Path>, verbose: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .or_else(carevault_config::find_config_file);

    if let Some(ref path) = path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults and environment.\n");
    }

    let diagnostics = collect_diagnostics(path.as_deref())?;

    let mut shown = 0;
    for d in &diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{label}{RESET} {}", d.message);
        } else {
            eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        }
        shown += 1;
    }

    let count = |s: Severity| diagnostics.iter().filter(|d| d.severity == s).count();
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Raw-file checks (TOML only) followed by checks on the effective config.
fn collect_diagnostics(path: Option<&Path>) -> Result<Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();

    if let Some(path) = path
        && path.extension().is_some_and(|ext| ext == "toml")
    {
        let raw = std::fs::read_to_string(path)?;
        diagnostics.extend(validate_toml_str(&raw));
    }

    let loaded = match path {
        Some(path) => carevault_config::load_config(path),
        None => Ok(CarevaultConfig::default()),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            if !diagnostics.iter().any(|d| d.category == "syntax") {
                diagnostics.push(Diagnostic {
                    severity: Severity::Error,
                    category: "syntax",
                    path: String::new(),
                    message: format!("{e:#}"),
                });
            }
            return Ok(diagnostics);
        },
    };

    match carevault_config::apply_env_overrides(config) {
        Ok(config) => diagnostics.extend(validate(&config)),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: String::new(),
            message: e.to_string(),
        }),
    }

    Ok(diagnostics)
}

/// Path from `--config`, if it exists.
pub fn explicit_config_path(path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) if !path.exists() => {
            anyhow::bail!("config file not found: {}", path.display())
        },
        other => Ok(other),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn reports_typo_and_inline_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "carevault.toml",
            &format!("[server]\nprot = 1\n\n[encryption]\nkey = \"{KEY}\"\n"),
        );

        let diags = collect_diagnostics(Some(&path)).unwrap();
        assert!(diags.iter().any(|d| d.path == "server.prot"));
        assert!(
            diags
                .iter()
                .any(|d| d.path == "encryption.key" && d.severity == Severity::Warning)
        );
    }

    #[test]
    fn syntax_error_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "carevault.toml", "[server\n");

        let diags = collect_diagnostics(Some(&path)).unwrap();
        assert_eq!(diags.iter().filter(|d| d.category == "syntax").count(), 1);
    }

    #[test]
    fn yaml_parse_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "carevault.yaml", "server: [unclosed\n");

        let diags = collect_diagnostics(Some(&path)).unwrap();
        assert!(diags.iter().any(|d| d.category == "syntax"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(explicit_config_path(Some(dir.path().join("nope.toml"))).is_err());
        assert!(explicit_config_path(None).unwrap().is_none());
    }
}
