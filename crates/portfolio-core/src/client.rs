//! The user-facing completion client
//!
//! Wraps an optional [`CompletionProvider`] and turns every outcome into text
//! the chat can display. Nothing here fails: a missing key yields the
//! placeholder, a broken request yields the generic error string, and an empty
//! answer yields the "try again" string.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ai::{CompletionError, CompletionProvider, DemoClient, GeminiClient, OpenAIClient};
use crate::config::{Config, DegradedMode};
use crate::provider::Provider;

/// Fixed strings shown in the chat. Each can be overridden in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replies {
    pub greeting: String,
    pub placeholder: String,
    pub demo: String,
    pub unavailable: String,
    pub error: String,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            greeting: "Hi! I'm Zhong Huiyu's AI assistant. Ask me about his project experience, \
                       ROS skills or research directions."
                .to_string(),
            placeholder: "API key is not configured. Set GEMINI_API_KEY or OPENAI_API_KEY, \
                          or add a key to the config file."
                .to_string(),
            demo: "(Demo mode) Zhong Huiyu works across ROS, C++ and Python, deploys YOLO models \
                   with TensorRT on Jetson, and builds laser and motion control for agricultural \
                   robots. Configure an API key for real answers."
                .to_string(),
            unavailable: "The AI can't respond right now, please try again later.".to_string(),
            error: "Something went wrong reaching the AI service. Check your network or try again later."
                .to_string(),
        }
    }
}

#[derive(Clone)]
pub struct CompletionClient {
    provider: Option<Arc<dyn CompletionProvider>>,
    replies: Replies,
}

impl CompletionClient {
    /// A client with no provider: every call returns the placeholder.
    pub fn placeholder(replies: Replies) -> Self {
        Self { provider: None, replies }
    }

    pub fn with_provider(provider: Arc<dyn CompletionProvider>, replies: Replies) -> Self {
        Self { provider: Some(provider), replies }
    }

    /// Pick the backend from configuration: the resolved provider when a key
    /// is available, otherwise the configured degraded mode.
    pub fn from_config(config: &Config) -> Self {
        let replies = config.replies.clone();

        let Some((provider, api_key)) = config.resolve_provider() else {
            tracing::info!(mode = ?config.degraded, "No API key configured, running degraded");
            return match config.degraded {
                DegradedMode::Placeholder => Self::placeholder(replies),
                DegradedMode::Demo => {
                    let demo = DemoClient::new(&replies.demo);
                    Self::with_provider(Arc::new(demo), replies)
                }
            };
        };

        let model = config.model_for(provider);
        tracing::info!(provider = provider.as_str(), model = %model, "Using completion provider");

        match provider {
            Provider::Gemini => Self::with_provider(Arc::new(GeminiClient::new(&api_key, &model)), replies),
            Provider::OpenAI => Self::with_provider(Arc::new(OpenAIClient::new(&api_key, &model)), replies),
        }
    }

    pub fn replies(&self) -> &Replies {
        &self.replies
    }

    /// True when replies don't come from a real model.
    pub fn is_degraded(&self) -> bool {
        self.provider.as_ref().map_or(true, |p| !p.is_remote())
    }

    pub fn provider_name(&self) -> &str {
        self.provider.as_ref().map_or("Offline", |p| p.name())
    }

    /// Ask for a reply to `user_text`, optionally under a system context.
    pub async fn complete(&self, user_text: &str, context: Option<&str>) -> String {
        let Some(provider) = &self.provider else {
            tracing::debug!("Completion skipped, no provider configured");
            return self.replies.placeholder.clone();
        };

        match provider.complete(user_text, context).await {
            Ok(reply) => reply,
            Err(err @ (CompletionError::EmptyReply | CompletionError::Decode(_))) => {
                tracing::warn!(provider = provider.name(), error = %err, "Completion returned no usable reply");
                self.replies.unavailable.clone()
            }
            Err(err) => {
                tracing::error!(provider = provider.name(), error = %err, "Completion request failed");
                self.replies.error.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{EmptyProvider, FailingProvider, RecordingProvider};
    use std::time::{Duration, Instant};

    fn config_without_keys() -> Config {
        Config::new().with_env(|_| None)
    }

    #[tokio::test]
    async fn test_no_provider_returns_placeholder() {
        let client = CompletionClient::placeholder(Replies::default());
        let started = Instant::now();

        let reply = client.complete("What robotics skills does he have?", Some("ctx")).await;

        assert_eq!(reply, Replies::default().placeholder);
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(client.is_degraded());
    }

    #[tokio::test]
    async fn test_failure_returns_error_string() {
        let client = CompletionClient::with_provider(Arc::new(FailingProvider), Replies::default());
        assert_eq!(client.complete("hi", None).await, Replies::default().error);
    }

    #[tokio::test]
    async fn test_empty_reply_returns_unavailable() {
        let client = CompletionClient::with_provider(Arc::new(EmptyProvider), Replies::default());
        let reply = client.complete("hi", None).await;

        assert_eq!(reply, Replies::default().unavailable);
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_returns_error_string() {
        let gemini = GeminiClient::new("key", "model").with_base_url("http://127.0.0.1:1");
        let client = CompletionClient::with_provider(Arc::new(gemini), Replies::default());

        assert_eq!(client.complete("hi", Some("ctx")).await, Replies::default().error);
        assert!(!client.is_degraded());
    }

    #[tokio::test]
    async fn test_context_is_forwarded() {
        let provider = Arc::new(RecordingProvider::new("ok"));
        let client = CompletionClient::with_provider(provider.clone(), Replies::default());

        client.complete("question", Some("profile context")).await;

        assert_eq!(provider.last_prompt().as_deref(), Some("question"));
        assert_eq!(provider.last_system().as_deref(), Some("profile context"));
    }

    #[tokio::test]
    async fn test_custom_placeholder_is_used() {
        let mut config = config_without_keys();
        config.replies.placeholder = "no key here".to_string();
        let client = CompletionClient::from_config(&config);

        assert_eq!(client.complete("hi", None).await, "no key here");
        assert_eq!(client.provider_name(), "Offline");
    }

    #[tokio::test]
    async fn test_demo_mode_without_key() {
        let mut config = config_without_keys();
        config.degraded = DegradedMode::Demo;
        let client = CompletionClient::from_config(&config);
        let started = Instant::now();

        let reply = client.complete("What robotics skills does he have?", None).await;

        assert_eq!(reply, Replies::default().demo);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(client.is_degraded());
        assert_eq!(client.provider_name(), "Demo");
    }

    #[test]
    fn test_key_selects_provider() {
        let config = Config::new().with_env(|name| {
            (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        });
        let client = CompletionClient::from_config(&config);

        assert_eq!(client.provider_name(), "OpenAI");
        assert!(!client.is_degraded());
    }
}
