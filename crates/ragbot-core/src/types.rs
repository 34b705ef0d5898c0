//! Core types for Ragbot — transcript turns, vendors, sampling parameters
//! and credentials.
//!
//! These are the normalized shapes every provider adapter translates to and
//! from. Vendor wire formats never leak past `ragbot-providers`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────
// Turns
// ─────────────────────────────────────────────

/// Who authored a turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One message in a conversation transcript.
///
/// Turns are never edited once appended; the only removal is a full clear.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Set on assistant turns synthesized from a failed completion.
    /// Adapters keep these out of the context sent upstream.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Turn {
            role: Role::User,
            content: content.into(),
            error: false,
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Turn {
            role: Role::Assistant,
            content: content.into(),
            error: false,
        }
    }

    /// Create an assistant turn carrying a rendered failure message.
    pub fn error(content: impl Into<String>) -> Self {
        Turn {
            role: Role::Assistant,
            content: content.into(),
            error: true,
        }
    }
}

// ─────────────────────────────────────────────
// Vendors
// ─────────────────────────────────────────────

/// The LLM vendors Ragbot can talk to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Gemini,
    Groq,
    Claude,
    #[serde(rename = "openai")]
    OpenAi,
    Perplexity,
}

impl Vendor {
    /// Every vendor, in display order.
    pub const ALL: [Vendor; 5] = [
        Vendor::Gemini,
        Vendor::Groq,
        Vendor::Claude,
        Vendor::OpenAi,
        Vendor::Perplexity,
    ];

    /// Config / CLI identifier (e.g. `"openai"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Gemini => "gemini",
            Vendor::Groq => "groq",
            Vendor::Claude => "claude",
            Vendor::OpenAi => "openai",
            Vendor::Perplexity => "perplexity",
        }
    }

    /// Human-readable name for messages and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Vendor::Gemini => "Gemini",
            Vendor::Groq => "Groq",
            Vendor::Claude => "Claude",
            Vendor::OpenAi => "OpenAI",
            Vendor::Perplexity => "Perplexity",
        }
    }

    /// Environment variable holding this vendor's API key.
    pub fn env_key(&self) -> &'static str {
        match self {
            Vendor::Gemini => "GOOGLE_API_KEY",
            Vendor::Groq => "GROQ_API_KEY",
            Vendor::Claude => "CLAUDE_API_KEY",
            Vendor::OpenAi => "OPENAI_API_KEY",
            Vendor::Perplexity => "PERPLEXITY_API_KEY",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when parsing an unknown vendor name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown vendor '{0}' (expected one of: gemini, groq, claude, openai, perplexity)")]
pub struct UnknownVendor(pub String);

impl FromStr for Vendor {
    type Err = UnknownVendor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Vendor::Gemini),
            "groq" => Ok(Vendor::Groq),
            "claude" | "anthropic" => Ok(Vendor::Claude),
            "openai" | "gpt" => Ok(Vendor::OpenAi),
            "perplexity" | "pplx" => Ok(Vendor::Perplexity),
            _ => Err(UnknownVendor(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────
// Personas
// ─────────────────────────────────────────────

/// Which built-in system prompt a session starts with.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Customer-support assistant grounded in the company knowledge base.
    #[default]
    Support,
    /// Plain general-purpose assistant.
    Standard,
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "support" | "rag" => Ok(Persona::Support),
            "standard" | "llm" => Ok(Persona::Standard),
            other => Err(format!("unknown persona '{other}' (expected support or standard)")),
        }
    }
}

// ─────────────────────────────────────────────
// Sampling
// ─────────────────────────────────────────────

/// Invalid sampling parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error("temperature must be between 0.0 and 1.0, got {0}")]
    Temperature(f64),
    #[error("max output tokens must be positive")]
    MaxOutputTokens,
}

/// Generation parameters for one completion call.
///
/// Fields are private so the ranges checked in [`SamplingConfig::new`] hold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingConfig {
    temperature: f64,
    max_output_tokens: u32,
}

impl SamplingConfig {
    /// Validate and build a sampling config.
    pub fn new(temperature: f64, max_output_tokens: u32) -> Result<Self, SamplingError> {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(SamplingError::Temperature(temperature));
        }
        if max_output_tokens == 0 {
            return Err(SamplingError::MaxOutputTokens);
        }
        Ok(Self {
            temperature,
            max_output_tokens,
        })
    }

    /// Sampling temperature, in `[0.0, 1.0]`.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Requested output length before any vendor cap.
    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    /// Output length capped at a vendor's upper bound.
    pub fn max_output_tokens_capped(&self, vendor_limit: u32) -> u32 {
        self.max_output_tokens.min(vendor_limit)
    }

    /// Copy with a different temperature.
    pub fn with_temperature(self, temperature: f64) -> Result<Self, SamplingError> {
        Self::new(temperature, self.max_output_tokens)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

// ─────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────

/// An API key bound to one vendor.
///
/// `Debug` is redacted and there is no `Display`; call [`expose`] only at the
/// point the key goes on the wire.
///
/// [`expose`]: ProviderCredential::expose
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential(String);

impl ProviderCredential {
    /// Wrap a key. Blank keys count as absent.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw key.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderCredential(***)")
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
