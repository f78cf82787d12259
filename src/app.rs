//! The one-shot pipeline.
//!
//! Context capture → redaction → prompt → credential → completion. The App
//! holds the per-run configuration; nothing is carried between runs except
//! the stored credential.

use async_openai::types::CreateChatCompletionRequest;
use tracing::{debug, info};

use crate::ai::{self, AiClient, Prompt, Response};
use crate::config::{Credential, CredentialSource, CredentialStore, Settings};
use crate::context::{ContextManager, ContextSnapshot, RawInput};
use crate::error::Result;
use crate::security::{Redacted, Redactor};
use crate::ui::setup;

pub struct App {
    settings: Settings,
    redactor: Redactor,
    context_manager: ContextManager,
}

impl App {
    /// Fails only when the user's extra redaction patterns do not compile.
    pub fn new(settings: Settings) -> Result<Self> {
        let redactor = Redactor::with_settings(&settings.redaction)?;
        let context_manager = ContextManager::new(&settings);
        Ok(Self {
            settings,
            redactor,
            context_manager,
        })
    }

    pub fn without_history(mut self) -> Self {
        self.context_manager = self.context_manager.without_history();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self, input: RawInput) -> ContextSnapshot {
        self.context_manager.snapshot(input)
    }

    /// Redact every part of the snapshot and build the prompt from it.
    ///
    /// Piped input is capped to `max_input_bytes` from the end, after
    /// redaction, since the last lines of an error are the useful ones.
    pub fn prepare(&self, snapshot: &ContextSnapshot) -> Result<Prompt> {
        let error_output = self
            .redactor
            .redact_tail(&snapshot.input.piped, self.settings.max_input_bytes);
        let hint = snapshot
            .input
            .hint
            .as_deref()
            .map(|hint| self.redactor.redact(hint));
        let history: Vec<Redacted> = snapshot
            .recent_history
            .iter()
            .map(|cmd| self.redactor.redact(cmd))
            .collect();

        let prompt = ai::prompt::build(&error_output, hint.as_ref(), &history)?;
        debug!(
            mode = prompt.mode().as_str(),
            piped_bytes = snapshot.input.piped.len(),
            history = history.len(),
            "prompt built"
        );
        Ok(prompt)
    }

    /// The exact request body [`App::ask`] would send.
    pub fn request(&self, prompt: &Prompt) -> Result<CreateChatCompletionRequest> {
        ai::build_request(&self.settings, prompt)
    }

    pub async fn ask(&self, prompt: &Prompt, credential: &Credential) -> Result<Response> {
        AiClient::new(&self.settings, credential).complete(prompt).await
    }
}

/// Load the credential, running the first-run setup when none exists.
pub fn resolve_credential(store: &CredentialStore) -> Result<(Credential, CredentialSource)> {
    if let Some(found) = store.resolve(|name| std::env::var(name).ok())? {
        return Ok(found);
    }
    info!("no credential configured");
    let credential = setup::run_interactive(store)?;
    Ok((credential, CredentialSource::Setup(store.path().to_path_buf())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::PromptMode;
    use crate::config::RedactionSettings;
    use crate::error::CliError;

    fn app() -> App {
        App::new(Settings::default()).unwrap().without_history()
    }

    #[test]
    fn test_prepare_redacts_piped_input_and_hint() {
        let app = app();
        let snapshot = ContextSnapshot {
            input: RawInput::new(
                "api_key=sk-ABC123\nconnection reset",
                &["debug".into(), "password=hunter2".into()],
            ),
            recent_history: vec!["mysql --password hunter2".into()],
        };
        let prompt = app.prepare(&snapshot).unwrap();

        assert_eq!(prompt.mode(), PromptMode::ExplainWithHint);
        assert!(!prompt.text().contains("sk-ABC123"));
        assert!(!prompt.text().contains("hunter2"));
        assert!(prompt.text().contains("connection reset"));
    }

    #[test]
    fn test_request_body_has_no_secret() {
        let app = app();
        let snapshot = ContextSnapshot {
            input: RawInput::new("api_key=sk-ABC123", &["debug connection".into()]),
            recent_history: vec![],
        };
        let prompt = app.prepare(&snapshot).unwrap();
        let body = serde_json::to_string(&app.request(&prompt).unwrap()).unwrap();

        assert!(!body.contains("sk-ABC123"));
        assert!(body.contains("[REDACTED]"));
        assert!(body.contains("debug connection"));
    }

    #[test]
    fn test_no_input() {
        let app = app();
        let snapshot = app.snapshot(RawInput::new("", &[]));
        assert!(matches!(app.prepare(&snapshot), Err(CliError::NoInput)));
    }

    #[test]
    fn test_long_input_keeps_tail() {
        let settings = Settings {
            max_input_bytes: 64,
            ..Settings::default()
        };
        let app = App::new(settings).unwrap().without_history();
        let mut piped = String::new();
        for i in 0..50 {
            piped.push_str(&format!("warning: noise line {i}\n"));
        }
        piped.push_str("error: the real failure\n");

        let prompt = app.prepare(&app.snapshot(RawInput::new(piped, &[]))).unwrap();
        assert!(prompt.text().contains("error: the real failure"));
        assert!(!prompt.text().contains("noise line 0\n"));
        assert!(prompt.text().contains("...[truncated]"));
    }

    #[test]
    fn test_invalid_extra_pattern_rejected() {
        let settings = Settings {
            redaction: RedactionSettings {
                extra_patterns: vec!["[".into()],
                allow: vec![],
            },
            ..Settings::default()
        };
        assert!(matches!(App::new(settings), Err(CliError::Config(_))));
    }
}
