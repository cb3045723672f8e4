//! `${VAR}` and `${VAR:-fallback}` expansion in raw config text.
//!
//! Expansion happens before parsing, so secrets such as the encryption key can
//! live in the environment while the file only names them.

/// Expand placeholders from the process environment.
///
/// Unset variables without a fallback are left as written, which lets
/// validation report them instead of silently producing an empty value.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Expansion with an injectable lookup, so tests never touch the real env.
pub(crate) fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            // Unterminated: keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name).filter(|v| !v.is_empty()), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => out.push_str(&rest[start..start + 2 + end + 1]),
        }

        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
