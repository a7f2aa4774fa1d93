use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{non_empty, CompletionError, CompletionProvider};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIResponseMessage>,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn query(&self, prompt: &str, system: Option<&str>) -> Result<String, CompletionError> {
        let request = build_request(&self.model, prompt, system);

        tracing::debug!(model = %self.model, "Sending OpenAI request");

        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status: status.as_u16(), body });
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;
        extract_reply(openai_response)
    }

    pub fn list_models() -> Vec<String> {
        vec![
            DEFAULT_OPENAI_MODEL.to_string(),
            "gpt-4o".to_string(),
            "gpt-4-turbo".to_string(),
            "gpt-3.5-turbo".to_string(),
        ]
    }
}

#[async_trait]
impl CompletionProvider for OpenAIClient {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, CompletionError> {
        self.query(prompt, system).await
    }
}

fn build_request(model: &str, prompt: &str, system: Option<&str>) -> OpenAIRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
    }
    messages.push(OpenAIMessage {
        role: "user".to_string(),
        content: prompt.to_string(),
    });

    OpenAIRequest {
        model: model.to_string(),
        messages,
    }
}

fn extract_reply(response: OpenAIResponse) -> Result<String, CompletionError> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content);
    non_empty(text)
}
