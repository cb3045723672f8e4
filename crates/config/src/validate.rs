//! Configuration validation.
//!
//! [`validate`] checks a loaded config for values the server cannot start
//! with. [`validate_toml_str`] inspects raw TOML for misspelled keys and for
//! an encryption key written inline instead of referenced from the
//! environment.

use crate::{key::resolve_encryption_key, schema::CarevaultConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "value", "security"
    pub category: &'static str,
    /// Dotted path, e.g. "server.port"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} [{}]: {}", self.severity, self.category, self.message)
        } else {
            write!(
                f,
                "{} [{}] {}: {}",
                self.severity, self.category, self.path, self.message
            )
        }
    }
}

/// Returns `true` if any diagnostic is an error.
#[must_use]
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Check a loaded (and env-overridden) config.
#[must_use]
pub fn validate(config: &CarevaultConfig) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    if config.server.port == 0 {
        out.push(Diagnostic::new(
            Severity::Error,
            "value",
            "server.port",
            "port must be between 1 and 65535",
        ));
    }
    if config.server.bind.trim().is_empty() {
        out.push(Diagnostic::new(
            Severity::Error,
            "value",
            "server.bind",
            "bind address is empty",
        ));
    }
    if config.documents.max_document_bytes == 0 {
        out.push(Diagnostic::new(
            Severity::Error,
            "value",
            "documents.max_document_bytes",
            "size limit must be greater than zero",
        ));
    }
    if config.database.url.trim().is_empty() {
        out.push(Diagnostic::new(
            Severity::Error,
            "value",
            "database.url",
            "database url is empty",
        ));
    } else if config.database.is_memory() {
        out.push(Diagnostic::new(
            Severity::Warning,
            "value",
            "database.url",
            "in-memory store: documents are lost on restart",
        ));
    }

    if let Err(e) = resolve_encryption_key(config) {
        out.push(Diagnostic::new(
            Severity::Error,
            "security",
            "encryption.key",
            e.to_string(),
        ));
    }

    out
}

const KNOWN_FIELDS: &[(&str, &[&str])] = &[
    ("server", &["bind", "port"]),
    ("database", &["url"]),
    ("encryption", &["key"]),
    ("documents", &["max_document_bytes"]),
];

/// Inspect raw TOML before substitution.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    let value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            out.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("TOML syntax error: {e}"),
            ));
            return out;
        },
    };
    let Some(root) = value.as_table() else {
        return out;
    };

    let sections: Vec<&str> = KNOWN_FIELDS.iter().map(|(s, _)| *s).collect();
    for (section, body) in root {
        let Some((_, fields)) = KNOWN_FIELDS.iter().find(|(s, _)| s == section) else {
            out.push(unknown_field(section, section, &sections));
            continue;
        };
        let Some(table) = body.as_table() else {
            out.push(Diagnostic::new(
                Severity::Error,
                "value",
                section,
                "expected a table",
            ));
            continue;
        };
        for key in table.keys() {
            if !fields.contains(&key.as_str()) {
                out.push(unknown_field(&format!("{section}.{key}"), key, fields));
            }
        }
    }

    if let Some(key) = root
        .get("encryption")
        .and_then(|e| e.get("key"))
        .and_then(toml::Value::as_str)
        && !key.trim().is_empty()
        && !key.contains("${")
    {
        out.push(Diagnostic::new(
            Severity::Warning,
            "security",
            "encryption.key",
            "key is written inline; reference it with \"${CAREVAULT_ENCRYPTION_KEY}\" instead",
        ));
    }

    out
}

fn unknown_field(path: &str, name: &str, candidates: &[&str]) -> Diagnostic {
    let suggestion = candidates
        .iter()
        .map(|c| (levenshtein(name, c), *c))
        .filter(|(d, _)| *d <= 3)
        .min_by_key(|(d, _)| *d);
    let message = match suggestion {
        Some((_, c)) => format!("unknown field \"{name}\" (did you mean \"{c}\"?)"),
        None => format!("unknown field \"{name}\""),
    };
    Diagnostic::new(Severity::Error, "unknown-field", path, message)
}

/// Edit distance, for "did you mean" hints.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }
    prev[b.len()]
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    const KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

    fn valid_config() -> CarevaultConfig {
        let mut cfg = CarevaultConfig::default();
        cfg.encryption.key = Some(Secret::new(KEY.to_string()));
        cfg
    }

    fn paths(diags: &[Diagnostic], severity: Severity) -> Vec<String> {
        diags
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.path.clone())
            .collect()
    }

    #[test]
    fn valid_config_has_no_diagnostics() {
        assert!(validate(&valid_config()).is_empty());
    }

    #[test]
    fn missing_key_is_an_error() {
        let diags = validate(&CarevaultConfig::default());
        assert!(has_errors(&diags));
        assert_eq!(paths(&diags, Severity::Error), vec!["encryption.key"]);
    }

    #[test]
    fn short_key_is_an_error() {
        let mut cfg = valid_config();
        cfg.encryption.key = Some(Secret::new("c2hvcnQ=".into()));
        assert_eq!(paths(&validate(&cfg), Severity::Error), vec!["encryption.key"]);
    }

    #[test]
    fn zero_port_and_limit_are_errors() {
        let mut cfg = valid_config();
        cfg.server.port = 0;
        cfg.documents.max_document_bytes = 0;
        let errors = paths(&validate(&cfg), Severity::Error);
        assert_eq!(errors, vec!["server.port", "documents.max_document_bytes"]);
    }

    #[test]
    fn memory_database_is_a_warning() {
        let mut cfg = valid_config();
        cfg.database.url = "memory".into();
        let diags = validate(&cfg);
        assert!(!has_errors(&diags));
        assert_eq!(paths(&diags, Severity::Warning), vec!["database.url"]);
    }

    #[test]
    fn misspelled_field_gets_suggestion() {
        let diags = validate_toml_str("[server]\nprot = 80\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "server.prot");
        assert!(diags[0].message.contains("did you mean \"port\""));
    }

    #[test]
    fn unknown_section_is_reported() {
        let diags = validate_toml_str("[databse]\nurl = \"memory\"\n");
        assert_eq!(diags[0].category, "unknown-field");
        assert!(diags[0].message.contains("\"database\""));
    }

    #[test]
    fn syntax_error_is_reported() {
        let diags = validate_toml_str("[server\n");
        assert_eq!(diags[0].category, "syntax");
        assert!(has_errors(&diags));
    }

    #[test]
    fn inline_key_warns_but_placeholder_does_not() {
        let inline = validate_toml_str(&format!("[encryption]\nkey = \"{KEY}\"\n"));
        assert_eq!(paths(&inline, Severity::Warning), vec!["encryption.key"]);

        let referenced = validate_toml_str("[encryption]\nkey = \"${CAREVAULT_ENCRYPTION_KEY}\"\n");
        assert!(referenced.is_empty());
    }

    #[test]
    fn levenshtein_distances() {
        assert_eq!(levenshtein("port", "port"), 0);
        assert_eq!(levenshtein("prot", "port"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("serer", "server"), 1);
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(Severity::Error, "value", "server.port", "bad");
        assert_eq!(d.to_string(), "error [value] server.port: bad");
    }
}
