//! Completion providers
//!
//! Each provider speaks one vendor's HTTP schema and returns either the reply
//! text or a [`CompletionError`]. Turning errors into user-facing text is the
//! job of [`crate::client::CompletionClient`], not the providers.

use async_trait::async_trait;
use thiserror::Error;

pub mod demo;
pub mod gemini;
pub mod openai;
#[cfg(test)]
pub(crate) mod testing;

pub use demo::DemoClient;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("response contained no reply text")]
    EmptyReply,
}

/// Something that can answer a prompt, optionally steered by a system context.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short label used in logs and the chat title.
    fn name(&self) -> &str;

    /// Whether `complete` goes over the network.
    fn is_remote(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, CompletionError>;
}

/// Treat a missing or blank reply the same way.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, CompletionError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(CompletionError::EmptyReply),
    }
}
