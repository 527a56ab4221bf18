//! Anthropic Messages API client.

use ringbook_shared::config::LlmConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::GenerationError;
use super::model::{ChatModel, ChatRequest, ContentBlock};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a [ContentBlock],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ReplyBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplyBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Chat model backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Creates a client from configuration.
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn body<'a>(&'a self, request: &'a ChatRequest) -> MessagesBody<'a> {
        MessagesBody {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.0,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.content,
            }],
        }
    }
}

/// Concatenates the text blocks of a reply.
fn reply_text(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ReplyBlock::Text { text } => Some(text),
            ReplyBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

impl ChatModel for AnthropicClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, GenerationError> {
        let res = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.body(&request))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(GenerationError::Endpoint {
                status: status.as_u16(),
                message,
            });
        }

        let response: MessagesResponse = res
            .json()
            .await
            .map_err(|e| GenerationError::InvalidOutput(e.to_string()))?;
        let text = reply_text(response);
        debug!(model = %self.model, chars = text.len(), "Model replied");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> AnthropicClient {
        AnthropicClient::new(&LlmConfig {
            api_key: "key".into(),
            model: "claude-test".into(),
            base_url: "https://api.example.com/".into(),
            max_tokens: 512,
            timeout_secs: 30,
        })
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        assert_eq!(client.base_url, "https://api.example.com");

        let request = ChatRequest {
            system: "be a bookkeeper".into(),
            content: vec![
                ContentBlock::text("Bought lunch for 60"),
                ContentBlock::image("image/png", "iVBORw0KGgo="),
            ],
        };
        let body = serde_json::to_value(client.body(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "claude-test",
                "max_tokens": 512,
                "temperature": 0.0,
                "system": "be a bookkeeper",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "Bought lunch for 60"},
                        {"type": "image", "source": {
                            "type": "base64",
                            "media_type": "image/png",
                            "data": "iVBORw0KGgo="
                        }}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_reply_text_skips_non_text_blocks() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "{\"date\":"},
                {"type": "tool_use", "id": "x", "name": "y", "input": {}},
                {"type": "text", "text": "\"2026-04-02\"}"}
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();

        assert_eq!(reply_text(response), r#"{"date":"2026-04-02"}"#);
    }

    #[test]
    fn test_error_body_parses() {
        let err: ErrorResponse = serde_json::from_str(
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        )
        .unwrap();
        assert_eq!(err.error.message, "Overloaded");
    }
}
