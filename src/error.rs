//! Error taxonomy for a single clihelper invocation.
//!
//! Every variant is terminal: it is printed as one line on stderr and mapped
//! to a distinct process exit code. Nothing here is retried.

use thiserror::Error;

/// Exit codes reported to the shell.
pub mod exit_code {
    pub const OTHER: u8 = 1;
    pub const NO_INPUT: u8 = 2;
    pub const AUTH_MISSING: u8 = 3;
    pub const NETWORK_FAILURE: u8 = 4;
    pub const REMOTE_ERROR: u8 = 5;
}

#[derive(Error, Debug)]
pub enum CliError {
    /// Neither piped input nor a hint was supplied.
    #[error("no input: pipe an error into clihelper or pass a question")]
    NoInput,

    #[error("no API key available: {0}")]
    AuthMissing(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Non-2xx or malformed reply from the API, message kept verbatim.
    #[error("remote error: {0}")]
    RemoteError(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::NoInput => exit_code::NO_INPUT,
            CliError::AuthMissing(_) => exit_code::AUTH_MISSING,
            CliError::NetworkFailure(_) => exit_code::NETWORK_FAILURE,
            CliError::RemoteError(_) => exit_code::REMOTE_ERROR,
            CliError::Config(_) | CliError::Io(_) => exit_code::OTHER,
        }
    }

    /// Render as a single line, folding any embedded newlines.
    pub fn one_line(&self) -> String {
        self.to_string()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
