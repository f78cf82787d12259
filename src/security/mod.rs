//! Security module: scrubbing secrets out of text before it leaves the machine.
//!
//! The only way to obtain a [`Redacted`] value is through [`Redactor`], and
//! the prompt builder accepts nothing else, so unredacted terminal text
//! cannot reach the network layer.

mod allowlist;
mod redactor;

use std::fmt;

pub use allowlist::Allowlist;
pub use redactor::{RedactionRule, Redactor, TRUNCATION_MARKER};

/// Replacement marker for every secret.
pub const PLACEHOLDER: &str = "[REDACTED]";

/// Text that has been through the [`Redactor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redacted(String);

impl Redacted {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether there is anything other than whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Redacted {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
