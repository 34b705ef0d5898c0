//! Adapter for OpenAI-compatible `/chat/completions` APIs.
//!
//! Covers: Groq, OpenAI, Perplexity. Perplexity is configured single-shot
//! in the registry, so its request carries one flattened user message.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ragbot_core::config::ProviderConfig;
use ragbot_core::{
    CompletionError, CompletionResult, ProviderCredential, SamplingConfig, Turn, Vendor,
};

use crate::context::{conversation_turns, dropped_turns, flatten_prompt, latest_user_text};
use crate::http::HttpTransport;
use crate::registry::{resolve_api_base, resolve_model, HistoryMode, ProviderSpec};
use crate::traits::ProviderAdapter;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: std::borrow::Cow<'a, str>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

// ─────────────────────────────────────────────
// OpenAiCompatAdapter
// ─────────────────────────────────────────────

/// Talks to any OpenAI-compatible chat completions endpoint.
pub struct OpenAiCompatAdapter {
    transport: HttpTransport,
    /// API base URL without trailing slash (e.g. `"https://api.groq.com/openai/v1"`).
    api_base: String,
    model: String,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for OpenAiCompatAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatAdapter")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.spec.display_name())
            .finish()
    }
}

impl OpenAiCompatAdapter {
    /// Create an adapter from a vendor spec and its config section.
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

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn build_messages<'a>(
        &self,
        system_prompt: &'a str,
        history: &'a [Turn],
    ) -> Result<Vec<ChatMessage<'a>>, CompletionError> {
        let no_user_turn = || CompletionError::Unknown {
            vendor: self.spec.vendor,
            message: "no user message to send".to_string(),
        };

        match self.spec.history {
            HistoryMode::LatestOnly => {
                let text = latest_user_text(history).ok_or_else(no_user_turn)?;
                let dropped = dropped_turns(history);
                if dropped > 0 {
                    debug!(
                        provider = self.spec.display_name(),
                        dropped, "single-shot vendor: earlier turns not sent"
                    );
                }
                Ok(vec![ChatMessage {
                    role: "user",
                    content: flatten_prompt(system_prompt, text).into(),
                }])
            }
            HistoryMode::Full => {
                let turns = conversation_turns(history);
                if turns.is_empty() {
                    return Err(no_user_turn());
                }
                let mut messages = Vec::with_capacity(turns.len() + 1);
                if !system_prompt.trim().is_empty() {
                    messages.push(ChatMessage {
                        role: "system",
                        content: system_prompt.into(),
                    });
                }
                messages.extend(turns.into_iter().map(|t| ChatMessage {
                    role: t.role.as_str(),
                    content: t.content.as_str().into(),
                }));
                Ok(messages)
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatAdapter {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[Turn],
        config: &SamplingConfig,
        credential: Option<&ProviderCredential>,
    ) -> CompletionResult {
        let credential = credential.ok_or(CompletionError::AuthMissing {
            vendor: self.spec.vendor,
        })?;

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: self.build_messages(system_prompt, history)?,
            temperature: config.temperature(),
            max_tokens: config.max_output_tokens_capped(self.spec.max_output_tokens),
        };

        debug!(
            provider = self.spec.display_name(),
            model = %self.model,
            messages = request_body.messages.len(),
            "Calling LLM"
        );

        let request = self
            .transport
            .client()
            .post(self.completions_url())
            .bearer_auth(credential.expose())
            .json(&request_body);

        let body = self.transport.send(request).await?;
        let response: ChatCompletionResponse = self.transport.decode(&body)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| self.transport.malformed("no choices in response"))?;

        debug!(
            provider = self.spec.display_name(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );

        choice
            .message
            .content
            .ok_or_else(|| self.transport.malformed("choices[0].message.content missing"))
    }

    fn vendor(&self) -> Vendor {
        self.spec.vendor
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

    fn make_adapter(vendor: Vendor, api_base: &str) -> OpenAiCompatAdapter {
        let config = ProviderConfig {
            api_key: String::new(),
            api_base: Some(api_base.to_string()),
            model: None,
        };
        OpenAiCompatAdapter::new(find_by_vendor(vendor), &config, Duration::from_secs(30)).unwrap()
    }

    fn key(value: &str) -> ProviderCredential {
        ProviderCredential::new(value).unwrap()
    }

    fn success_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
    }

    async fn sent_body(server: &MockServer) -> serde_json::Value {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1, "exactly one outbound call");
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let adapter = make_adapter(Vendor::OpenAi, "https://api.openai.com/v1/");
        assert_eq!(
            adapter.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_model() {
        let adapter = make_adapter(Vendor::Groq, "http://localhost");
        assert_eq!(adapter.model(), "llama-3.1-8b-instant");
        assert_eq!(adapter.vendor(), Vendor::Groq);
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer gsk-test-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("4 PM EST")))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::Groq, &mock_server.uri());
        let history = vec![Turn::user("What are your business hours?")];

        let answer = adapter
            .complete(
                "You are a support agent.",
                &history,
                &SamplingConfig::default(),
                Some(&key("gsk-test-123")),
            )
            .await
            .unwrap();

        assert_eq!(answer, "4 PM EST");
    }

    #[tokio::test]
    async fn test_multi_turn_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::OpenAi, &mock_server.uri());
        let history = vec![
            Turn::assistant("Welcome!"),
            Turn::user("hi"),
            Turn::assistant("hello"),
            Turn::error("⚠️ timed out"),
            Turn::user("again"),
        ];
        let sampling = SamplingConfig::new(0.25, 50_000).unwrap();

        adapter
            .complete("SYS", &history, &sampling, Some(&key("sk-1")))
            .await
            .unwrap();

        let body = sent_body(&mock_server).await;
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.25);
        // Capped at the vendor limit
        assert_eq!(body["max_tokens"], 16384);
        assert_eq!(
            body["messages"],
            serde_json::json!([
                { "role": "system", "content": "SYS" },
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "hello" },
                { "role": "user", "content": "again" }
            ])
        );
    }

    #[tokio::test]
    async fn test_perplexity_flattens_latest_turn() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::Perplexity, &mock_server.uri());
        let history = vec![
            Turn::user("old question"),
            Turn::assistant("old answer"),
            Turn::user("new question"),
        ];

        adapter
            .complete("SYS", &history, &SamplingConfig::default(), Some(&key("pplx-1")))
            .await
            .unwrap();

        let body = sent_body(&mock_server).await;
        assert_eq!(
            body["messages"],
            serde_json::json!([{ "role": "user", "content": "SYS\n\nnew question" }])
        );
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .expect(0)
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::Groq, &mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), None)
            .await
            .unwrap_err();

        assert_eq!(err, CompletionError::AuthMissing { vendor: Vendor::Groq });
    }

    #[tokio::test]
    async fn test_api_error_keeps_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::Groq, &mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key("k")))
            .await
            .unwrap_err();

        match err {
            CompletionError::Http { vendor, status, body } => {
                assert_eq!(vendor, Vendor::Groq);
                assert_eq!(status, 429);
                assert_eq!(body, "Rate limit exceeded");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_200_success_status_is_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(success_body("ok")))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::OpenAi, &mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key("k")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::HttpError);
    }

    #[tokio::test]
    async fn test_missing_content_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": null }, "finish_reason": "stop" }]
            })))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::OpenAi, &mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key("k")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::Groq, &mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key("k")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::Groq, &mock_server.uri());
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key("k")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let config = ProviderConfig {
            api_base: Some(mock_server.uri()),
            ..Default::default()
        };
        let adapter = OpenAiCompatAdapter::new(
            find_by_vendor(Vendor::Groq),
            &config,
            Duration::from_millis(200),
        )
        .unwrap();

        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key("k")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[tokio::test]
    async fn test_network_error_is_unknown() {
        // Point to a port that's not listening
        let adapter = make_adapter(Vendor::OpenAi, "http://127.0.0.1:1");
        let err = adapter
            .complete("", &[Turn::user("hi")], &SamplingConfig::default(), Some(&key("k")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unknown);
    }

    #[tokio::test]
    async fn test_no_user_turn_is_rejected_before_sending() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let adapter = make_adapter(Vendor::OpenAi, &mock_server.uri());
        let err = adapter
            .complete("", &[Turn::assistant("Welcome!")], &SamplingConfig::default(), Some(&key("k")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unknown);
    }
}
