//! Adapter for Google Gemini `generateContent`.
//!
//! The key travels as the `key` query parameter, so the request URL is
//! never logged. Requests are single-shot: the system prompt and the latest
//! user turn are flattened into one text part.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ragbot_core::config::ProviderConfig;
use ragbot_core::{
    CompletionError, CompletionResult, ProviderCredential, SamplingConfig, Turn, Vendor,
};

use crate::context::{dropped_turns, flatten_prompt, latest_user_text};
use crate::http::HttpTransport;
use crate::registry::{resolve_api_base, resolve_model, ProviderSpec};
use crate::traits::ProviderAdapter;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`
    fn answer_text(self) -> Result<String, String> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let candidate = self.candidates.into_iter().next().ok_or_else(|| match block_reason {
            Some(reason) => format!("no candidates (prompt blocked: {reason})"),
            None => "no candidates".to_string(),
        })?;

        let finish_reason = candidate.finish_reason;
        candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                format!(
                    "candidates[0].content.parts[0].text missing (finish reason: {})",
                    finish_reason.as_deref().unwrap_or("?")
                )
            })
    }
}

// ─────────────────────────────────────────────
// GeminiAdapter
// ─────────────────────────────────────────────

pub struct GeminiAdapter {
    transport: HttpTransport,
    api_base: String,
    model: String,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiAdapter {
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

    /// Endpoint without the key.
    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[Turn],
        config: &SamplingConfig,
        credential: Option<&ProviderCredential>,
    ) -> CompletionResult {
        let credential = credential.ok_or(CompletionError::AuthMissing {
            vendor: Vendor::Gemini,
        })?;

        let user_text = latest_user_text(history).ok_or_else(|| CompletionError::Unknown {
            vendor: Vendor::Gemini,
            message: "no user message to send".to_string(),
        })?;

        let dropped = dropped_turns(history);
        if dropped > 0 {
            debug!(dropped, "single-shot vendor: earlier turns not sent");
        }

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(flatten_prompt(system_prompt, user_text)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature(),
                max_output_tokens: config.max_output_tokens_capped(self.spec.max_output_tokens),
            },
        };

        debug!(provider = "Gemini", model = %self.model, "Calling LLM");

        let request = self
            .transport
            .client()
            .post(self.generate_url())
            .query(&[("key", credential.expose())])
            .json(&request_body);

        let body = self.transport.send(request).await?;
        let response: GenerateContentResponse = self.transport.decode(&body)?;

        response
            .answer_text()
            .map_err(|detail| self.transport.malformed(detail))
    }

    fn vendor(&self) -> Vendor {
        Vendor::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
