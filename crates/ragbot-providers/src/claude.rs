//! Adapter for the Anthropic Messages API.
//!
//! The system prompt goes in the top-level `system` field. The API expects
//! the conversation to open with a user turn and roles to alternate, so
//! consecutive turns from the same role are merged before sending.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ragbot_core::config::ProviderConfig;
use ragbot_core::{
    CompletionError, CompletionResult, ProviderCredential, Role, SamplingConfig, Turn, Vendor,
};

use crate::context::conversation_turns;
use crate::http::HttpTransport;
use crate::registry::{resolve_api_base, resolve_model, ProviderSpec};
use crate::traits::ProviderAdapter;

/// Value of the `anthropic-version` header.
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ClaudeMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize, PartialEq)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Collapse conversational turns into alternating user/assistant messages.
fn to_claude_messages(history: &[Turn]) -> Vec<ClaudeMessage> {
    let mut messages: Vec<ClaudeMessage> = Vec::new();
    for turn in conversation_turns(history) {
        let role = match turn.role {
            Role::Assistant => "assistant",
            _ => "user",
        };
        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&turn.content);
            }
            _ => messages.push(ClaudeMessage {
                role,
                content: turn.content.clone(),
            }),
        }
    }
    messages
}

// ─────────────────────────────────────────────
// ClaudeAdapter
// ─────────────────────────────────────────────

pub struct ClaudeAdapter {
    transport: HttpTransport,
    api_base: String,
    model: String,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for ClaudeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeAdapter")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl ClaudeAdapter {
    pub fn new(
        spec: &'static ProviderSpec,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(spec.vendor, timeout)?,
            api_base: resolve_api_base(spec, config),
            model: resolve_model(spec, config),
            spec,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base)
    }
}

#[async_trait]
impl ProviderAdapter for ClaudeAdapter {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[Turn],
        config: &SamplingConfig,
        credential: Option<&ProviderCredential>,
    ) -> CompletionResult {
        let credential = credential.ok_or(CompletionError::AuthMissing {
            vendor: Vendor::Claude,
        })?;

        let messages = to_claude_messages(history);
        if messages.is_empty() {
            return Err(CompletionError::Unknown {
                vendor: Vendor::Claude,
                message: "no user message to send".to_string(),
            });
        }

        let system_prompt = system_prompt.trim();
        let request_body = MessagesRequest {
            model: &self.model,
            system: (!system_prompt.is_empty()).then_some(system_prompt),
            messages,
            max_tokens: config.max_output_tokens_capped(self.spec.max_output_tokens),
            temperature: config.temperature(),
        };

        debug!(
            provider = "Claude",
            model = %self.model,
            messages = request_body.messages.len(),
            "Calling LLM"
        );

        let request = self
            .transport
            .client()
            .post(self.messages_url())
            .header("x-api-key", credential.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body);

        let body = self.transport.send(request).await?;
        let response: MessagesResponse = self.transport.decode(&body)?;

        debug!(
            provider = "Claude",
            stop_reason = response.stop_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );

        response
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| self.transport.malformed("no text content block"))
    }

    fn vendor(&self) -> Vendor {
        Vendor::Claude
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_by_vendor;
    use ragbot_core::FailureKind;
    use wiremock::matchers::{any, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_adapter(api_base: &str) -> ClaudeAdapter {
        let config = ProviderConfig {
            api_base: Some(api_base.to_string()),
            model: Some("claude-3-haiku-20240307".to_string()),
            ..Default::default()
        };
        ClaudeAdapter::new(find_by_vendor(Vendor::Claude), &config, Duration::from_secs(30)).unwrap()
    }

    fn key() -> ProviderCredential {
        ProviderCredential::new("sk-ant-test").unwrap()
    }

    #[test]
    fn test_to_claude_messages_merges_and_skips() {
        let history = vec![
            Turn::assistant("Welcome!"),
            Turn::user("first"),
            Turn::error("⚠️ HTTP 500"),
            Turn::user("second"),
            Turn::assistant("reply"),
        ];
        let messages = to_claude_messages(&history);
        assert_eq!(
            messages,
            vec![
                ClaudeMessage { role: "user", content: "first\n\nsecond".into() },
                ClaudeMessage { role: "assistant", content: "reply".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_complete_success_and_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "text", "text": "4 PM EST" }],
                "stop_reason": "end_turn"
            })))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(&mock_server.uri());
        let history = vec![
            Turn::user("Hi"),
            Turn::assistant("Hello!"),
            Turn::user("What are your business hours?"),
        ];

        let answer = adapter
            .complete("Be concise.", &history, &SamplingConfig::default(), Some(&key()))
            .await
            .unwrap();
        assert_eq!(answer, "4 PM EST");

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "claude-3-haiku-20240307");
        assert_eq!(body["system"], "Be concise.");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][2]["content"], "What are your business hours?");
    }

    #[tokio::test]
    async fn test_blank_system_prompt_is_omitted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text", "text": "ok" }]
            })))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(&mock_server.uri());
        adapter
            .complete("  ", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key()))
            .await
            .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("system").is_none());
    }

    #[tokio::test]
    async fn test_skips_non_text_blocks() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    { "type": "thinking", "thinking": "hmm" },
                    { "type": "text", "text": "answer" }
                ]
            })))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(&mock_server.uri());
        let answer = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key()))
            .await
            .unwrap();
        assert_eq!(answer, "answer");
    }

    #[tokio::test]
    async fn test_empty_content_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": []
            })))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(&mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_overloaded_is_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(&mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key()))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Http { status: 529, .. }));
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(&mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err, CompletionError::AuthMissing { vendor: Vendor::Claude });
    }
}
