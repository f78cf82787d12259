//! AI module: prompt building and the completion client.
//!
//! A prompt is built once from redacted context, sent in a single request,
//! and the reply handed straight to the presenter.

pub mod client;
pub mod prompt;

pub use client::{AiClient, Response, build_request};
pub use prompt::{Prompt, PromptMode};
