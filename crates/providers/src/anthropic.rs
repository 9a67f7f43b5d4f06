//! Anthropic native provider implementation.
//!
//! Uses Anthropic's Messages API directly.
//!
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as top-level field
//! - Reply content arrives as a list of typed blocks; every block is kept as
//!   a segment so callers can join all text, not just the first block

use std::time::Duration;

use async_trait::async_trait;
use coursebot_core::error::ProviderError;
use coursebot_core::message::ChatMessage;
use coursebot_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Anthropic native Messages API provider.
pub struct AnthropicProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with a client-side request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Use a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the Messages API request body.
    fn request_body(request: &ProviderRequest) -> MessagesRequest<'_> {
        MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: request.system.as_deref(),
            messages: request.messages.iter().map(AnthropicMessage::from).collect(),
        }
    }

    /// Pull `error.message` out of an Anthropic error envelope, or fall back
    /// to the raw body.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorEnvelope>(body)
            .map(|env| env.error.message)
            .unwrap_or_else(|_| body.trim().to_string())
    }

    /// Convert the Messages API response to our ProviderResponse.
    fn response_to_provider_response(resp: MessagesResponse) -> ProviderResponse {
        let content = resp
            .content
            .into_iter()
            .map(|block| match (block.kind.as_str(), block.text) {
                ("text", Some(text)) => ContentSegment::Text { text },
                (kind, _) => ContentSegment::Other {
                    kind: kind.to_string(),
                },
            })
            .collect();

        ProviderResponse {
            content,
            usage: resp.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
            model: resp.model,
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = Self::request_body(&request);

        debug!(
            provider = "anthropic",
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }
        if status == 401 || status == 403 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(Self::error_message(
                &error_body,
            )));
        }
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: Self::error_message(&error_body),
            });
        }

        let api_resp: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse Anthropic response: {e}")))?;

        Ok(Self::response_to_provider_response(api_resp))
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for AnthropicMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new("sk-ant-test", Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn constructor() {
        let provider = provider();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn constructor_with_base_url() {
        let provider = provider().with_base_url("https://custom.proxy.com/");
        assert_eq!(provider.base_url, "https://custom.proxy.com");
    }

    #[test]
    fn request_body_has_top_level_system() {
        let request = ProviderRequest {
            model: "claude-sonnet-4-20250514".into(),
            system: Some("You teach dental materials.".into()),
            messages: vec![
                ChatMessage::user("Hi"),
                ChatMessage::assistant("Hello!"),
                ChatMessage::user("What is alginate?"),
            ],
            max_tokens: 4096,
        };
        let json = serde_json::to_value(AnthropicProvider::request_body(&request)).unwrap();

        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["system"], "You teach dental materials.");
        assert_eq!(json["messages"].as_array().unwrap().len(), 3);
        assert_eq!(json["messages"][1]["role"], "assistant");
        assert_eq!(json["messages"][2]["content"], "What is alginate?");
    }

    #[test]
    fn request_body_without_system() {
        let request = ProviderRequest {
            model: "m".into(),
            system: None,
            messages: vec![ChatMessage::user("Hi")],
            max_tokens: 1,
        };
        let json = serde_json::to_value(AnthropicProvider::request_body(&request)).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn parse_text_response() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "model": "claude-sonnet-4-20250514",
                "content": [{"type": "text", "text": "Hello!"}],
                "usage": {"input_tokens": 10, "output_tokens": 5},
                "stop_reason": "end_turn"
            }"#,
        )
        .unwrap();

        let pr = AnthropicProvider::response_to_provider_response(resp);
        assert_eq!(pr.text(), "Hello!");
        assert_eq!(
            pr.usage,
            Some(Usage {
                input_tokens: 10,
                output_tokens: 5
            })
        );
        assert_eq!(pr.model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn parse_multi_block_response_keeps_every_segment() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{
                "model": "claude-sonnet-4-20250514",
                "content": [
                    {"type": "thinking", "thinking": "I need to consider..."},
                    {"type": "text", "text": "Part one. "},
                    {"type": "text", "text": "Part two."}
                ]
            }"#,
        )
        .unwrap();

        let pr = AnthropicProvider::response_to_provider_response(resp);
        assert_eq!(pr.content.len(), 3);
        assert_eq!(
            pr.content[0],
            ContentSegment::Other {
                kind: "thinking".into()
            }
        );
        assert_eq!(pr.text(), "Part one. Part two.");
        assert!(pr.usage.is_none());
    }

    #[test]
    fn error_message_from_envelope() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"prompt is too long"}}"#;
        assert_eq!(AnthropicProvider::error_message(body), "prompt is too long");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(
            AnthropicProvider::error_message("  upstream connect error \n"),
            "upstream connect error"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let provider = provider().with_base_url("http://127.0.0.1:1");
        let err = provider
            .complete(ProviderRequest {
                model: "m".into(),
                system: None,
                messages: vec![ChatMessage::user("Hi")],
                max_tokens: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Network(_) | ProviderError::Timeout(_)
        ));
    }
}
