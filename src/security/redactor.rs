//! Secret redaction for captured terminal text.
//!
//! Every piece of text that leaves the machine passes through [`Redactor`].
//! The rule list is explicit and ordered; each rule either replaces its
//! whole match with the placeholder or keeps a keyword prefix and replaces
//! only the captured value. Applying the redactor twice gives the same
//! result as applying it once.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, error};

use super::allowlist::Allowlist;
use super::{PLACEHOLDER, Redacted};
use crate::config::RedactionSettings;
use crate::error::{CliError, Result};

/// Marker prepended when input is cut down to its tail.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Upper bound on full passes over the rule list.
const MAX_PASSES: usize = 4;

/// How a rule rewrites its match.
#[derive(Debug, Clone, Copy)]
enum RuleKind {
    /// Replace the entire match.
    Whole,
    /// Keep `pre`/`post`, replace `secret` unless the allowlist permits it
    /// or the guard rejects it.
    Value { guard: fn(&str) -> bool },
    /// PEM style block: `pre`, placeholder line, optional `post`.
    Block,
}

#[derive(Debug, Clone)]
pub struct RedactionRule {
    name: String,
    pattern: Regex,
    kind: RuleKind,
}

impl RedactionRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn apply<'t>(&self, text: &'t str, allow: &Allowlist) -> Cow<'t, str> {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| self.rewrite(caps, allow))
    }

    fn rewrite(&self, caps: &Captures<'_>, allow: &Allowlist) -> String {
        let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());
        match self.kind {
            RuleKind::Whole => PLACEHOLDER.to_string(),
            RuleKind::Value { guard } => {
                let (open, secret, close) = split_quotes(group("secret"));
                if secret.is_empty() || allow.permits(secret) || !guard(secret) {
                    return caps.get(0).map_or("", |m| m.as_str()).to_string();
                }
                format!("{}{open}{PLACEHOLDER}{close}{}", group("pre"), group("post"))
            }
            RuleKind::Block => {
                let mut out = format!("{}\n{PLACEHOLDER}", group("pre"));
                let post = group("post");
                if !post.is_empty() {
                    out.push('\n');
                    out.push_str(post);
                }
                out
            }
        }
    }
}

/// Separate a leading quote, and its matching closing quote, from a value.
fn split_quotes(value: &str) -> (&str, &str, &str) {
    let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return ("", value, "");
    };
    let (open, rest) = value.split_at(quote.len_utf8());
    match rest.strip_suffix(quote) {
        Some(inner) => (open, inner, &rest[inner.len()..]),
        None => (open, rest, ""),
    }
}

fn any_value(_: &str) -> bool {
    true
}

/// Rejects values an earlier rule already replaced, such as the
/// `[REDACTED]@host` left behind by `url-credentials`.
fn not_yet_redacted(value: &str) -> bool {
    !value.starts_with(PLACEHOLDER)
}

/// Hex/base64 runs that are actually random-looking: mixed letters and digits.
fn looks_random(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit()) && value.chars().any(|c| c.is_ascii_alphabetic())
}

/// Built-in deny list, in application order.
const BUILTIN_PATTERNS: &[(&str, &str, RuleKind)] = &[
    (
        "private-key",
        r"(?s)(?P<pre>-----BEGIN [A-Z ]*PRIVATE KEY-----).*?(?P<post>-----END [A-Z ]*PRIVATE KEY-----)",
        RuleKind::Block,
    ),
    (
        "private-key-unterminated",
        r"(?P<pre>-----BEGIN [A-Z ]*PRIVATE KEY-----)(?P<secret>(?:\s*[A-Za-z0-9+/=]{16,})+)",
        RuleKind::Block,
    ),
    (
        "url-credentials",
        r"(?P<pre>\b[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s:/@]+:)(?P<secret>[^\s@/]+)(?P<post>@)",
        RuleKind::Value { guard: any_value },
    ),
    (
        "authorization",
        r#"(?i)(?P<pre>\bauthorization:[ \t]*(?:bearer|token|basic|digest)[ \t]+)(?P<secret>[^\s'"]+)"#,
        RuleKind::Value { guard: any_value },
    ),
    (
        "bearer",
        r"(?i)(?P<pre>\bbearer[ \t]+)(?P<secret>[A-Za-z0-9_\-.~+/]{8,}=*)",
        RuleKind::Value { guard: any_value },
    ),
    (
        "assignment",
        r#"(?i)(?P<pre>\b[a-z0-9_.\-]*(?:password|passwd|pwd|secret|token|api[_\-]?key|access[_\-]?key|private[_\-]?key|credential|auth|key)[a-z0-9_.\-]*["']?[ \t]*[:=][ \t]*)(?P<secret>"[^"\n]*"|'[^'\n]*'|["']?[^\s'",;&|]+)"#,
        RuleKind::Value { guard: not_yet_redacted },
    ),
    (
        "cli-flag",
        r#"(?i)(?P<pre>--(?:password|passwd|pass|secret|token|api-key)(?:=|\s+))(?P<secret>[^\s'"]+)"#,
        RuleKind::Value { guard: any_value },
    ),
    (
        "sshpass",
        r"(?P<pre>\bsshpass\s+-p\s*)(?P<secret>\S+)",
        RuleKind::Value { guard: any_value },
    ),
    (
        "keyword-token",
        r"(?i)(?P<pre>\b(?:password|passwd|secret|token|api[_\-]?key|key)s?[ \t]+)(?P<secret>[A-Za-z0-9+/_\-]{16,}={0,2})",
        RuleKind::Value { guard: looks_random },
    ),
    ("openai-key", r"\bsk-[A-Za-z0-9_\-]{16,}", RuleKind::Whole),
    (
        "github-token",
        r"\b(?:gh[pousr]_[A-Za-z0-9]{20,}|github_pat_[A-Za-z0-9_]{20,})",
        RuleKind::Whole,
    ),
    ("gitlab-token", r"\bglpat-[A-Za-z0-9_\-]{16,}", RuleKind::Whole),
    ("slack-token", r"\bxox[abprs]-[A-Za-z0-9\-]{10,}", RuleKind::Whole),
    ("aws-access-key", r"\b(?:AKIA|ASIA)[0-9A-Z]{16}\b", RuleKind::Whole),
    (
        "stripe-key",
        r"\b(?:sk|rk|pk)_(?:live|test)_[A-Za-z0-9]{16,}",
        RuleKind::Whole,
    ),
    (
        "jwt",
        r"\beyJ[A-Za-z0-9_\-]{8,}\.[A-Za-z0-9_\-]{8,}\.[A-Za-z0-9_\-]{8,}",
        RuleKind::Whole,
    ),
    ("card-number", r"\b(?:\d{4}[ \-]?){3}\d{4}\b", RuleKind::Whole),
];

static BUILTIN_RULES: LazyLock<Vec<RedactionRule>> = LazyLock::new(|| {
    BUILTIN_PATTERNS
        .iter()
        .filter_map(|(name, pattern, kind)| match Regex::new(pattern) {
            Ok(pattern) => Some(RedactionRule {
                name: (*name).to_string(),
                pattern,
                kind: *kind,
            }),
            Err(e) => {
                error!("built-in redaction rule {} failed to compile: {}", name, e);
                None
            }
        })
        .collect()
});

/// Applies the redaction rules. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<RedactionRule>,
    allowlist: Allowlist,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Redactor {
    /// Redactor with only the built-in rules.
    pub fn new() -> Self {
        Self {
            rules: BUILTIN_RULES.to_vec(),
            allowlist: Allowlist::new(),
        }
    }

    /// Built-in rules plus the user's extra patterns and allowed values.
    ///
    /// An extra pattern that fails to compile is a configuration error
    /// rather than being skipped.
    pub fn with_settings(settings: &RedactionSettings) -> Result<Self> {
        let mut redactor = Self::new();
        for (idx, raw) in settings.extra_patterns.iter().enumerate() {
            let pattern = Regex::new(raw).map_err(|e| {
                CliError::Config(format!("invalid redaction pattern {raw:?}: {e}"))
            })?;
            redactor.rules.push(RedactionRule {
                name: format!("custom-{}", idx + 1),
                pattern,
                kind: RuleKind::Whole,
            });
        }
        for value in &settings.allow {
            redactor.allowlist.allow_value(value);
        }
        Ok(redactor)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(RedactionRule::name)
    }

    /// Replace every secret-shaped substring with the placeholder.
    ///
    /// The rule list is re-applied until the text stops changing: a
    /// replacement can expose a match for an earlier rule, e.g. a quoted
    /// value collapsing inside the userinfo part of a URL.
    pub fn redact(&self, text: &str) -> Redacted {
        let mut current = self.apply_rules(text);
        for _ in 1..MAX_PASSES {
            let next = self.apply_rules(&current);
            if next == current {
                break;
            }
            current = next;
        }
        Redacted(current)
    }

    fn apply_rules(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            if let Cow::Owned(replaced) = rule.apply(&current, &self.allowlist) {
                if replaced != current {
                    debug!(rule = rule.name(), "redaction rule matched");
                    current = replaced;
                }
            }
        }
        current
    }

    /// Redact, then keep at most `max_bytes` from the end of the text.
    ///
    /// The cut lands on a line boundary when the tail holds more than one
    /// line. A zero limit keeps everything.
    pub fn redact_tail(&self, text: &str, max_bytes: usize) -> Redacted {
        let full = self.redact(text);
        match tail_on_line_boundary(full.as_str(), max_bytes) {
            // A partial line can expose a new match start, so re-check it.
            Some(tail) => self.redact(&format!("{TRUNCATION_MARKER}\n{tail}")),
            None => full,
        }
    }
}

/// The last `max_bytes` of `text`, starting on a fresh line when possible.
/// `None` when no truncation is needed.
fn tail_on_line_boundary(text: &str, max_bytes: usize) -> Option<&str> {
    if max_bytes == 0 || text.len() <= max_bytes {
        return None;
    }

    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    let tail = &text[start..];

    match tail.find('\n') {
        Some(idx) if idx + 1 < tail.len() => Some(&tail[idx + 1..]),
        _ => Some(tail),
    }
}
