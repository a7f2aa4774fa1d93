use crate::ai::gemini::DEFAULT_GEMINI_MODEL;
use crate::ai::openai::DEFAULT_OPENAI_MODEL;
use crate::ai::{GeminiClient, OpenAIClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAI,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Some(Provider::Gemini),
            "openai" => Some(Provider::OpenAI),
            _ => None,
        }
    }

    /// In the order tried when no provider is configured explicitly.
    pub fn all() -> Vec<Provider> {
        vec![Provider::Gemini, Provider::OpenAI]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini (Google)",
            Provider::OpenAI => "ChatGPT (OpenAI)",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => DEFAULT_GEMINI_MODEL,
            Provider::OpenAI => DEFAULT_OPENAI_MODEL,
        }
    }

    pub fn list_models(&self) -> Vec<String> {
        match self {
            Provider::Gemini => GeminiClient::list_models(),
            Provider::OpenAI => OpenAIClient::list_models(),
        }
    }
}
