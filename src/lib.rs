//! CLIHelper - instant command-line help from a language model
//!
//! Pipe a failing command's output into `clihelper`, optionally with a hint,
//! and get back an explanation and a corrected command:
//! - Context capture (piped stdin, recent shell history)
//! - Secret redaction before anything leaves the machine
//! - Prompt building and a single chat-completion request
//! - Framed terminal output of the answer
//!
//! # Example
//!
//! ```no_run
//! use clihelper::{App, RawInput, Settings};
//! use clihelper::config::Credential;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), clihelper::CliError> {
//!     let app = App::new(Settings::default())?.without_history();
//!     let snapshot = app.snapshot(RawInput::new(
//!         "ls: invalid option -- 'recursively'",
//!         &[],
//!     ));
//!     let prompt = app.prepare(&snapshot)?;
//!
//!     if let Some(key) = Credential::new("sk-...") {
//!         let response = app.ask(&prompt, &key).await?;
//!         println!("{}", response.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod security;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use ai::{AiClient, Prompt, PromptMode, Response};
pub use app::App;
pub use config::Settings;
pub use context::{ContextManager, ContextSnapshot, RawInput};
pub use error::CliError;
pub use security::{Redacted, Redactor};
