//! Values that look like secrets syntactically but must survive redaction.
//!
//! Keyword rules (`password=...`, `token: ...`) consult this list before
//! replacing the captured value, so shell variable references and values
//! that are already masked are passed through untouched.

use std::collections::HashSet;

use super::PLACEHOLDER;

/// Authorization scheme names that show up as the "value" of an
/// `Authorization:` header line.
const AUTH_SCHEMES: &[&str] = &["bearer", "basic", "token", "digest"];

#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    allowed_values: HashSet<String>,
}

impl Allowlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_value(&mut self, value: &str) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.allowed_values.insert(trimmed.to_string());
        }
    }

    /// Whether a captured secret value may be left as is.
    ///
    /// # Rules
    /// - the placeholder itself (keeps redaction idempotent)
    /// - fully masked values (`****`)
    /// - shell variable references (`$VAR`, `${VAR}`)
    /// - authorization scheme names (`Bearer`, `Basic`, ...)
    /// - anything added with [`Allowlist::allow_value`]
    pub fn permits(&self, value: &str) -> bool {
        if value == PLACEHOLDER {
            return true;
        }
        if !value.is_empty() && value.chars().all(|c| c == '*') {
            return true;
        }
        if is_variable_reference(value) {
            return true;
        }
        if AUTH_SCHEMES.iter().any(|s| value.eq_ignore_ascii_case(s)) {
            return true;
        }
        self.allowed_values.contains(value)
    }

    pub fn len(&self) -> usize {
        self.allowed_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed_values.is_empty()
    }
}

/// `$NAME` or `${NAME}` where NAME is a valid shell identifier.
fn is_variable_reference(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('$') else {
        return false;
    };
    let name = match rest.strip_prefix('{') {
        Some(inner) => match inner.strip_suffix('}') {
            Some(name) => name,
            None => return false,
        },
        None => rest,
    };

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permits_builtin_values() {
        let allow = Allowlist::new();
        assert!(allow.permits("[REDACTED]"));
        assert!(allow.permits("********"));
        assert!(allow.permits("$DB_PASSWORD"));
        assert!(allow.permits("${GITHUB_TOKEN}"));
        assert!(allow.permits("Bearer"));
        assert!(allow.permits("basic"));
    }

    #[test]
    fn test_rejects_secret_looking_values() {
        let allow = Allowlist::new();
        assert!(!allow.permits("hunter2"));
        assert!(!allow.permits("$(cat secret.txt)"));
        assert!(!allow.permits("${UNCLOSED"));
        assert!(!allow.permits("$1abc"));
        assert!(!allow.permits(""));
    }

    #[test]
    fn test_user_allowed_values() {
        let mut allow = Allowlist::new();
        allow.allow_value("  changeme  ");
        allow.allow_value("   ");
        assert_eq!(allow.len(), 1);
        assert!(allow.permits("changeme"));
        assert!(!allow.permits("changeme2"));
    }
}
