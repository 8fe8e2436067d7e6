/// LLM Client: the single point of entry for all Claude API calls in Tailor.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Pipeline stages depend on `TextGenerator` + `ModelInvoker`, never on `LlmClient`,
/// so generator quirks stay behind this boundary.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod invoker;
pub mod prompts;
pub mod recovery;

#[cfg(test)]
pub mod testing;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider refused the variant for this key (unknown model or access tier).
    #[error("model '{model}' is unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenates every text block in the response.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    #[serde(rename = "type", default)]
    error_type: String,
    message: String,
}

/// Capability interface over "prompt in, text out" for one named model variant.
///
/// Implemented by `LlmClient` in production and by a scripted double in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, model: &str, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Thin wrapper over the Anthropic Messages API.
///
/// Makes exactly one HTTP call per `call`; variant fallback lives in `ModelInvoker`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(api_key: String, max_tokens: u32) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            max_tokens,
        }
    }

    /// Makes a raw call to the Claude API for `model`, returning the full response object.
    pub async fn call(&self, model: &str, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(model, status.as_u16(), &body));
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: model={}, input_tokens={}, output_tokens={}",
            model, llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, model: &str, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(model, prompt, system).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }
}

/// Maps a non-2xx Anthropic response to an `LlmError`.
///
/// 403/404 and `not_found_error`/`permission_error` bodies mean the variant is not
/// usable with this key, which the invoker treats like any other failed attempt.
fn classify_api_error(model: &str, status: u16, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<AnthropicError>(body).ok();
    let error_type = parsed
        .as_ref()
        .map(|e| e.error.error_type.as_str())
        .unwrap_or("");
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| body.to_string());

    let unavailable = matches!(status, 403 | 404)
        || matches!(error_type, "not_found_error" | "permission_error");

    if unavailable {
        LlmError::ModelUnavailable {
            model: model.to_string(),
            message,
        }
    } else {
        LlmError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joins_text_blocks() {
        let response: LlmResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "{\"a\":"},
                {"type": "tool_use", "text": null},
                {"type": "text", "text": " 1}"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 4}
        }))
        .unwrap();
        assert_eq!(response.text(), "{\"a\": 1}");
    }

    #[test]
    fn test_not_found_is_model_unavailable() {
        let body = r#"{"type":"error","error":{"type":"not_found_error","message":"model: claude-x"}}"#;
        match classify_api_error("claude-x", 404, body) {
            LlmError::ModelUnavailable { model, message } => {
                assert_eq!(model, "claude-x");
                assert_eq!(message, "model: claude-x");
            }
            other => panic!("expected ModelUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_permission_error_is_model_unavailable() {
        let body = r#"{"type":"error","error":{"type":"permission_error","message":"tier"}}"#;
        assert!(matches!(
            classify_api_error("claude-x", 400, body),
            LlmError::ModelUnavailable { .. }
        ));
    }

    #[test]
    fn test_server_error_stays_api_error() {
        match classify_api_error("claude-x", 529, "overloaded") {
            LlmError::Api { status, message } => {
                assert_eq!(status, 529);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }
}
