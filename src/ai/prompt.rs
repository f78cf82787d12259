//! Prompt building for error explanations and direct questions.
//!
//! The builder only accepts [`Redacted`] text, so whatever ends up in a
//! [`Prompt`] has already been scrubbed of secrets.

use std::fmt;

use crate::error::{CliError, Result};
use crate::security::Redacted;

/// System prompt that defines the assistant's behavior.
pub const SYSTEM_PROMPT: &str = r#"You are a command-line assistant. Users come to you with terminal errors or questions about shell commands.

Guidelines:
1. Be concise and practical.
2. Prefix every shell command you suggest with "$ " on its own line.
3. Prefer portable POSIX-compliant commands when possible.
4. If a command could be destructive (deleting files, changing system settings), say so."#;

/// Which of the three templates a prompt was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Piped error output plus a hint from the user.
    ExplainWithHint,
    /// Piped error output only.
    ExplainError,
    /// A question with nothing piped.
    DirectQuery,
}

impl PromptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMode::ExplainWithHint => "explain-with-hint",
            PromptMode::ExplainError => "explain-error",
            PromptMode::DirectQuery => "direct-query",
        }
    }
}

/// Final text payload for the model. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    mode: PromptMode,
    text: String,
}

impl Prompt {
    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    pub fn system(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Build the prompt for one invocation.
///
/// Both error output and hint: explain the error in light of the hint.
/// Only error output: explain it. Only a hint: answer it directly.
/// Neither is [`CliError::NoInput`].
pub fn build(
    error_output: &Redacted,
    hint: Option<&Redacted>,
    recent_history: &[Redacted],
) -> Result<Prompt> {
    let hint = hint.filter(|h| !h.is_blank());
    let has_error = !error_output.is_blank();

    let mode = match (has_error, hint.is_some()) {
        (true, true) => PromptMode::ExplainWithHint,
        (true, false) => PromptMode::ExplainError,
        (false, true) => PromptMode::DirectQuery,
        (false, false) => return Err(CliError::NoInput),
    };

    let mut text = String::new();
    match mode {
        PromptMode::ExplainWithHint | PromptMode::ExplainError => {
            text.push_str("A user ran a command that didn't work.\n\n");
        }
        PromptMode::DirectQuery => {
            text.push_str("A user wants help with a command-line task.\n\n");
        }
    }

    push_history(&mut text, recent_history);

    if has_error {
        text.push_str("Error output:\n```\n");
        text.push_str(error_output.as_str().trim_end());
        text.push_str("\n```\n\n");
    }

    match (mode, hint) {
        (PromptMode::ExplainWithHint, Some(hint)) => {
            text.push_str("User context: ");
            text.push_str(hint.as_str().trim());
            text.push_str("\n\n");
            text.push_str("Explain the error in light of the user's context.\n");
            push_fix_steps(&mut text);
        }
        (PromptMode::DirectQuery, Some(hint)) => {
            text.push_str("User's question: ");
            text.push_str(hint.as_str().trim());
            text.push_str("\n\n");
            text.push_str(
                "Please provide helpful command-line advice. \
                 If they're asking about a specific command:\n",
            );
            text.push_str("1. Explain what the command does\n");
            text.push_str("2. Provide the correct syntax (prefix commands with $)\n");
            text.push_str("3. Give practical examples\n");
        }
        _ => push_fix_steps(&mut text),
    }

    text.push_str("\nBe concise and practical.");

    Ok(Prompt { mode, text })
}

fn push_history(text: &mut String, recent_history: &[Redacted]) {
    let commands: Vec<&str> = recent_history
        .iter()
        .filter(|c| !c.is_blank())
        .map(Redacted::as_str)
        .collect();
    if commands.is_empty() {
        return;
    }
    text.push_str("Recent command history:\n");
    for cmd in commands {
        text.push_str("  ");
        text.push_str(cmd);
        text.push('\n');
    }
    text.push('\n');
}

fn push_fix_steps(text: &mut String) {
    text.push_str("Please:\n");
    text.push_str("1. Briefly explain what went wrong\n");
    text.push_str("2. Provide the correct command (prefix with $)\n");
    text.push_str("3. Add a short explanation\n");
}
