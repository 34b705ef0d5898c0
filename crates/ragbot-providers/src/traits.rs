//! Provider adapter trait — the seam between a conversation and one vendor.

use async_trait::async_trait;
use ragbot_core::{CompletionResult, ProviderCredential, SamplingConfig, Turn, Vendor};

/// Translates a conversation into one vendor request and the vendor's
/// reply back into a [`CompletionResult`].
///
/// Implementations issue at most one HTTP call per `complete` and never
/// retry. All failures come back as `Err(CompletionError)`; nothing panics
/// and nothing is logged with the credential in it.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Ask the vendor for the next assistant turn.
    ///
    /// # Arguments
    /// * `system_prompt` — Prompt prepended to the conversation.
    /// * `history`       — Transcript so far; the last turn is the new user message.
    /// * `config`        — Temperature and output length.
    /// * `credential`    — API key; `None` fails with `AuthMissing` before any I/O.
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[Turn],
        config: &SamplingConfig,
        credential: Option<&ProviderCredential>,
    ) -> CompletionResult;

    /// The vendor this adapter talks to.
    fn vendor(&self) -> Vendor;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;
}
