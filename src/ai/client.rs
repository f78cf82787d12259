//! Chat-completion client for OpenAI-compatible endpoints.
//!
//! Exactly one HTTP attempt is made per prompt. Transport failures become
//! [`CliError::NetworkFailure`]; anything the server answers with becomes
//! [`CliError::RemoteError`] carrying its message unchanged.

use std::error::Error as StdError;
use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use tracing::{debug, info, warn};

use super::prompt::Prompt;
use crate::config::{Credential, Settings};
use crate::error::{CliError, Result};

/// Text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub text: String,
    pub model: String,
}

/// Build the chat-completion request body for a prompt.
///
/// Needs no credential, so `--dry-run` can show exactly what would be sent.
pub fn build_request(settings: &Settings, prompt: &Prompt) -> Result<CreateChatCompletionRequest> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(prompt.system().to_string())
        .build()
        .map_err(request_error)?
        .into();
    let user = ChatCompletionRequestUserMessageArgs::default()
        .content(prompt.text().to_string())
        .build()
        .map_err(request_error)?
        .into();

    let mut request = CreateChatCompletionRequestArgs::default()
        .model(settings.model.as_str())
        .messages(vec![system, user])
        .max_completion_tokens(settings.max_tokens)
        .build()
        .map_err(request_error)?;
    request.temperature = settings.temperature;
    Ok(request)
}

fn request_error(e: OpenAIError) -> CliError {
    CliError::Config(format!("could not build request: {e}"))
}

/// Backoff that gives up before the first retry.
fn single_attempt() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// One-shot client for an OpenAI-compatible chat-completion endpoint.
pub struct AiClient {
    client: Client<OpenAIConfig>,
    settings: Settings,
}

impl AiClient {
    pub fn new(settings: &Settings, credential: &Credential) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(credential.expose())
            .with_api_base(settings.api_base.as_str());
        Self {
            client: Client::with_config(config).with_backoff(single_attempt()),
            settings: settings.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Send the prompt and return the model's reply. Exactly one attempt.
    pub async fn complete(&self, prompt: &Prompt) -> Result<Response> {
        let request = build_request(&self.settings, prompt)?;
        info!(
            model = %self.settings.model,
            mode = prompt.mode().as_str(),
            prompt_bytes = prompt.text().len(),
            "sending completion request"
        );

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        debug!(choices = response.choices.len(), "completion received");
        let text = response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| CliError::RemoteError("the model returned an empty response".into()))?;

        Ok(Response {
            text,
            model: response.model,
        })
    }
}

/// Transport failures are network errors; anything the server said is a
/// remote error, passed through verbatim.
fn map_openai_error(err: OpenAIError) -> CliError {
    match err {
        OpenAIError::Reqwest(e) => {
            let message = error_chain(&e);
            warn!("request failed: {}", message);
            CliError::NetworkFailure(message)
        }
        OpenAIError::ApiError(api) => {
            warn!("API returned an error: {}", api.message);
            CliError::RemoteError(api.message)
        }
        other => {
            warn!("unexpected API reply: {}", other);
            CliError::RemoteError(other.to_string())
        }
    }
}

/// `outer: cause: root cause`, skipping causes already in the message.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
