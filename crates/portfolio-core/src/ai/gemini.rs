use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{non_empty, CompletionError, CompletionProvider};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part { text: text.to_string() }],
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint.
///
/// The API key travels in the `key` query parameter.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: GEMINI_BASE_URL.to_string(),
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
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let request = build_request(prompt, system);

        tracing::debug!(model = %self.model, "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Request(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;
        extract_reply(parsed)
    }

    pub fn list_models() -> Vec<String> {
        vec![
            DEFAULT_GEMINI_MODEL.to_string(),
            "gemini-2.5-flash".to_string(),
            "gemini-2.5-pro".to_string(),
        ]
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, CompletionError> {
        self.query(prompt, system).await
    }
}

fn build_request(prompt: &str, system: Option<&str>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(prompt)],
        system_instruction: system.map(Content::text),
    }
}

fn extract_reply(response: GenerateContentResponse) -> Result<String, CompletionError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text);
    non_empty(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::serve_once;
    use crate::client::{CompletionClient, Replies};
    use serde_json::json;
    use std::sync::Arc;

    fn parse(body: &str) -> GenerateContentResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_request_with_system_instruction() {
        let value = serde_json::to_value(build_request("hi", Some("be brief"))).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{ "parts": [{ "text": "hi" }] }],
                "systemInstruction": { "parts": [{ "text": "be brief" }] }
            })
        );
    }

    #[test]
    fn test_request_without_system_instruction() {
        let value = serde_json::to_value(build_request("hi", None)).unwrap();
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_first_part() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"first"},{"text":"second"}]}}]}"#;
        assert_eq!(extract_reply(parse(body)).unwrap(), "first");
    }

    #[test]
    fn test_extract_missing_fields() {
        for body in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
        ] {
            assert!(
                matches!(extract_reply(parse(body)), Err(CompletionError::EmptyReply)),
                "body {} should have no reply",
                body
            );
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        let client = GeminiClient::new("key", DEFAULT_GEMINI_MODEL).with_base_url("http://127.0.0.1:1/");
        let err = client.query("hi", None).await.unwrap_err();
        assert!(matches!(err, CompletionError::Request(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_status_error() {
        let base = serve_once("500 Internal Server Error", r#"{"error":1}"#).await;
        let client = GeminiClient::new("secret-key", DEFAULT_GEMINI_MODEL).with_base_url(&base);

        match client.query("hi", None).await {
            Err(CompletionError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, r#"{"error":1}"#);
            }
            Err(other) => panic!("expected status error, got {}", other),
            Ok(reply) => panic!("expected status error, got reply {}", reply),
        }

        let base = serve_once("500 Internal Server Error", r#"{"error":1}"#).await;
        let provider = Arc::new(GeminiClient::new("secret-key", DEFAULT_GEMINI_MODEL).with_base_url(&base));
        let client = CompletionClient::with_provider(provider, Replies::default());
        assert_eq!(client.complete("hi", None).await, Replies::default().error);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_decode_error() {
        let base = serve_once("200 OK", "not json").await;
        let client = GeminiClient::new("secret-key", DEFAULT_GEMINI_MODEL).with_base_url(&base);

        let err = client.query("hi", None).await.unwrap_err();
        assert!(matches!(err, CompletionError::Decode(_)));
        assert!(!err.to_string().contains("secret-key"));

        let base = serve_once("200 OK", "not json").await;
        let provider = Arc::new(GeminiClient::new("secret-key", DEFAULT_GEMINI_MODEL).with_base_url(&base));
        let client = CompletionClient::with_provider(provider, Replies::default());
        assert_eq!(client.complete("hi", None).await, Replies::default().unavailable);
    }
}
