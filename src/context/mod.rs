//! Context capture: what the user piped in, what they asked, and what
//! they ran recently.
//!
//! Everything produced here is raw and unredacted. It must go through
//! [`crate::security::Redactor`] before the prompt builder will accept it.

mod history;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use tracing::debug;

use crate::config::Settings;

pub use history::{History, find_history_file};

/// Piped command output plus the optional free-text hint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawInput {
    pub piped: String,
    pub hint: Option<String>,
}

impl RawInput {
    /// Hint words from the command line are joined with single spaces;
    /// blank hints become `None`.
    pub fn new(piped: impl Into<String>, hint_words: &[String]) -> Self {
        let hint = hint_words.join(" ");
        let hint = hint.trim();
        Self {
            piped: piped.into(),
            hint: (!hint.is_empty()).then(|| hint.to_string()),
        }
    }

    pub fn has_piped(&self) -> bool {
        !self.piped.trim().is_empty()
    }

    pub fn has_hint(&self) -> bool {
        self.hint.is_some()
    }
}

/// Everything gathered for one invocation.
#[derive(Clone, Debug, Default)]
pub struct ContextSnapshot {
    pub input: RawInput,
    pub recent_history: Vec<String>,
}

/// Gathers context according to the settings.
#[derive(Debug, Clone)]
pub struct ContextManager {
    history_lines: usize,
    history_file: Option<PathBuf>,
}

impl ContextManager {
    pub fn new(settings: &Settings) -> Self {
        Self {
            history_lines: settings.history_lines,
            history_file: settings.history_file.clone(),
        }
    }

    /// Turn shell history off for this run.
    pub fn without_history(mut self) -> Self {
        self.history_lines = 0;
        self
    }

    pub fn snapshot(&self, input: RawInput) -> ContextSnapshot {
        ContextSnapshot {
            input,
            recent_history: self.recent_history(),
        }
    }

    /// The last `history_lines` commands, empty when disabled or unavailable.
    pub fn recent_history(&self) -> Vec<String> {
        if self.history_lines == 0 {
            return Vec::new();
        }
        let home = dirs::home_dir();
        let Some(path) = find_history_file(
            self.history_file.as_deref(),
            |name| std::env::var(name).ok(),
            home.as_deref(),
        ) else {
            debug!("no shell history file found");
            return Vec::new();
        };

        let recent = History::load(&path).recent(self.history_lines);
        debug!(count = recent.len(), "loaded shell history from {}", path.display());
        recent
    }
}

/// Read everything piped on stdin.
///
/// Returns an empty string without reading when stdin is a terminal, so an
/// interactive invocation never blocks waiting for input.
pub fn read_piped_stdin() -> io::Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        debug!("stdin is a terminal, skipping read");
        return Ok(String::new());
    }
    read_all(stdin.lock())
}

/// Drain a reader, replacing invalid UTF-8.
pub fn read_all(mut reader: impl Read) -> io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    debug!(bytes = buf.len(), "read piped input");
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
