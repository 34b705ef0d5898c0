//! The conversation session: transcript owner and request orchestrator.
//!
//! A session holds the transcript, the selected vendor, sampling parameters
//! and system prompt. `submit` appends the user turn, makes one adapter call
//! bounded by the request timeout, and appends the answer or a rendered
//! error turn. Failures never escape as errors; they become chat messages.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use ragbot_core::config::Config;
use ragbot_core::{
    CompletionError, CompletionResult, ConfigError, ProviderCredential, SamplingConfig, Turn,
    Vendor,
};
use ragbot_providers::AdapterRegistry;

use crate::persona::resolve_system_prompt;
use crate::stats::SessionStats;

/// Default bound on a single completion call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────
// State
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a request is still in flight")]
    Busy,
}

/// Shown in place of an answer when a submit is dropped before it finishes.
pub const CANCELLED_MESSAGE: &str = "⚠️ Request cancelled before an answer arrived.";

/// Holds the session in `AwaitingResponse` while alive; back to `Idle` on drop.
///
/// The guard owns the pending exchange: it pushes the user turn on entry and
/// always leaves a reply behind it, a cancellation turn if none was recorded.
struct InFlight<'a> {
    state: &'a mut SessionState,
    turns: &'a mut Vec<Turn>,
    replied: bool,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a mut SessionState, turns: &'a mut Vec<Turn>, user_text: &str) -> Self {
        *state = SessionState::AwaitingResponse;
        turns.push(Turn::user(user_text));
        Self {
            state,
            turns,
            replied: false,
        }
    }

    fn history(&self) -> &[Turn] {
        self.turns.as_slice()
    }

    fn reply(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.replied = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.replied {
            debug!("Request dropped before completion");
            self.turns.push(Turn::error(CANCELLED_MESSAGE));
        }
        *self.state = SessionState::Idle;
    }
}

// ─────────────────────────────────────────────
// ConversationSession
// ─────────────────────────────────────────────

pub struct ConversationSession {
    turns: Vec<Turn>,
    vendor: Vendor,
    sampling: SamplingConfig,
    system_prompt: String,
    welcome_message: Option<String>,
    request_timeout: Duration,
    adapters: AdapterRegistry,
    credentials: HashMap<Vendor, ProviderCredential>,
    state: SessionState,
    stats: SessionStats,
    last_error: Option<CompletionError>,
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut configured: Vec<&str> = self.credentials.keys().map(|v| v.as_str()).collect();
        configured.sort_unstable();
        f.debug_struct("ConversationSession")
            .field("turns", &self.turns.len())
            .field("vendor", &self.vendor)
            .field("sampling", &self.sampling)
            .field("request_timeout", &self.request_timeout)
            .field("credentials", &configured)
            .field("state", &self.state)
            .finish()
    }
}

impl ConversationSession {
    /// An empty session on `vendor` with default sampling, no system prompt,
    /// no credentials and a 30 second request timeout.
    pub fn new(adapters: AdapterRegistry, vendor: Vendor) -> Self {
        Self {
            turns: Vec::new(),
            vendor,
            sampling: SamplingConfig::default(),
            system_prompt: String::new(),
            welcome_message: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            adapters,
            credentials: HashMap::new(),
            state: SessionState::Idle,
            stats: SessionStats::default(),
            last_error: None,
        }
    }

    /// Build a session from loaded configuration.
    ///
    /// Sampling and timeout are validated here. Credentials are read for
    /// every vendor; a missing one only matters once that vendor is used.
    pub fn from_config(config: &Config, adapters: AdapterRegistry) -> Result<Self, ConfigError> {
        let chat = &config.chat;
        if chat.request_timeout_secs == 0 {
            return Err(ConfigError::Timeout);
        }

        let credentials = Vendor::ALL
            .into_iter()
            .filter_map(|v| config.providers.credential(v).map(|c| (v, c)))
            .collect();

        Ok(Self::new(adapters, chat.vendor)
            .with_sampling(chat.sampling()?)
            .with_system_prompt(resolve_system_prompt(
                chat.persona,
                chat.system_prompt.as_deref(),
            ))
            .with_welcome_message(chat.welcome_message.clone())
            .with_request_timeout(chat.request_timeout())
            .with_credentials(credentials))
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Seed the transcript with one assistant turn, now and after every clear.
    /// Blank messages count as none.
    pub fn with_welcome_message(mut self, message: Option<String>) -> Self {
        self.welcome_message = message.filter(|m| !m.trim().is_empty());
        if self.turns.is_empty() {
            self.reset_turns();
        }
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_credentials(mut self, credentials: HashMap<Vendor, ProviderCredential>) -> Self {
        self.credentials = credentials;
        self
    }

    // ── Accessors ──

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Failure behind the most recent reply, if it was an error turn.
    pub fn last_error(&self) -> Option<&CompletionError> {
        self.last_error.as_ref()
    }

    /// Model the selected vendor's adapter will use, if one is registered.
    pub fn model(&self) -> Option<String> {
        self.adapters.get(self.vendor).map(|a| a.model().to_string())
    }

    pub fn has_credential(&self, vendor: Vendor) -> bool {
        self.credentials.contains_key(&vendor)
    }

    // ── Configuration (applies to the next submit only) ──

    pub fn select_vendor(&mut self, vendor: Vendor) {
        if vendor != self.vendor {
            info!(from = %self.vendor, to = %vendor, "Switching vendor");
            self.vendor = vendor;
        }
    }

    pub fn set_sampling(&mut self, sampling: SamplingConfig) {
        self.sampling = sampling;
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    // ── Operations ──

    /// Send one user message and record the reply.
    ///
    /// Blank input is ignored. Otherwise exactly two turns are appended: the
    /// user turn, then the assistant answer or an error turn.
    pub async fn submit(&mut self, user_text: &str) -> Result<&[Turn], SessionError> {
        if self.state == SessionState::AwaitingResponse {
            return Err(SessionError::Busy);
        }
        if user_text.trim().is_empty() {
            debug!("Ignoring blank message");
            return Ok(&self.turns);
        }

        let vendor = self.vendor;
        let started = Instant::now();
        let mut in_flight = InFlight::enter(&mut self.state, &mut self.turns, user_text);

        let result = match self.adapters.get(vendor) {
            Some(adapter) => {
                let call = adapter.complete(
                    &self.system_prompt,
                    in_flight.history(),
                    &self.sampling,
                    self.credentials.get(&vendor),
                );
                match tokio::time::timeout(self.request_timeout, call).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            provider = vendor.display_name(),
                            timeout = ?self.request_timeout,
                            "Completion timed out"
                        );
                        Err(CompletionError::Timeout {
                            vendor,
                            after: self.request_timeout,
                        })
                    }
                }
            }
            None => Err(CompletionError::Unknown {
                vendor,
                message: format!("no adapter registered for {vendor}"),
            }),
        };
        self.stats.record(&result, started.elapsed());

        in_flight.reply(reply_turn(vendor, &result));
        drop(in_flight);

        self.last_error = result.err();
        Ok(&self.turns)
    }

    /// Discard the transcript, re-seeding the welcome turn if one is set.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::AwaitingResponse {
            return Err(SessionError::Busy);
        }
        self.reset_turns();
        self.last_error = None;
        debug!(turns = self.turns.len(), "Transcript cleared");
        Ok(())
    }

    fn reset_turns(&mut self) {
        self.turns.clear();
        if let Some(welcome) = &self.welcome_message {
            self.turns.push(Turn::assistant(welcome.clone()));
        }
    }
}

/// The turn that answers a completion: the text, or the rendered failure.
fn reply_turn(vendor: Vendor, result: &CompletionResult) -> Turn {
    match result {
        Ok(answer) => {
            debug!(
                provider = vendor.display_name(),
                chars = answer.len(),
                "Answer received"
            );
            Turn::assistant(answer.clone())
        }
        Err(e) => {
            warn!(
                provider = e.vendor().display_name(),
                kind = e.kind().as_str(),
                error = %e,
                "Completion failed"
            );
            Turn::error(e.user_message())
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
