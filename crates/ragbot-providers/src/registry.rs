//! Provider registry — static specs for the 5 supported vendors.
//!
//! Each `ProviderSpec` describes how to reach one vendor: default endpoint
//! and model, output-length cap, wire format and how much of the
//! conversation the vendor integration sends.

use ragbot_core::config::ProviderConfig;
use ragbot_core::Vendor;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one vendor
// ─────────────────────────────────────────────

/// Request/response shape spoken by a vendor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireFormat {
    /// `POST /chat/completions`, Bearer auth, `choices[0].message.content`.
    OpenAiChat,
    /// `POST /models/{model}:generateContent?key=…`, `candidates[0].content.parts[0].text`.
    Gemini,
    /// `POST /messages`, `x-api-key` auth, first text content block.
    Anthropic,
}

/// How much of the transcript goes upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryMode {
    /// Every conversational turn, in order, with roles.
    Full,
    /// System prompt and latest user turn flattened into one user message.
    /// Earlier turns are dropped.
    LatestOnly,
}

/// Static specification describing one vendor.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub vendor: Vendor,
    /// Base URL the endpoint path is appended to.
    pub default_api_base: &'static str,
    /// Model used when the config doesn't name one.
    pub default_model: &'static str,
    /// Upper bound for `max_output_tokens` accepted by the default model.
    pub max_output_tokens: u32,
    pub wire: WireFormat,
    pub history: HistoryMode,
}

impl ProviderSpec {
    /// Human-readable name for logs (e.g. `"OpenAI"`).
    pub fn display_name(&self) -> &'static str {
        self.vendor.display_name()
    }

    /// Environment variable for the API key.
    pub fn env_key(&self) -> &'static str {
        self.vendor.env_key()
    }
}

// ─────────────────────────────────────────────
// All 5 vendors (same order as `Vendor::ALL`)
// ─────────────────────────────────────────────

/// Complete list of supported vendor specifications.
pub static PROVIDERS: [ProviderSpec; 5] = [
    // Gemini — single-shot prompting
    ProviderSpec {
        vendor: Vendor::Gemini,
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        default_model: "gemini-1.5-flash",
        max_output_tokens: 8192,
        wire: WireFormat::Gemini,
        history: HistoryMode::LatestOnly,
    },
    // Groq — OpenAI-compatible, multi-turn
    ProviderSpec {
        vendor: Vendor::Groq,
        default_api_base: "https://api.groq.com/openai/v1",
        default_model: "llama-3.1-8b-instant",
        max_output_tokens: 8192,
        wire: WireFormat::OpenAiChat,
        history: HistoryMode::Full,
    },
    // Claude — Anthropic Messages API, multi-turn
    ProviderSpec {
        vendor: Vendor::Claude,
        default_api_base: "https://api.anthropic.com/v1",
        default_model: "claude-3-5-sonnet-20240620",
        max_output_tokens: 4096,
        wire: WireFormat::Anthropic,
        history: HistoryMode::Full,
    },
    // OpenAI
    ProviderSpec {
        vendor: Vendor::OpenAi,
        default_api_base: "https://api.openai.com/v1",
        default_model: "gpt-4o-mini",
        max_output_tokens: 16384,
        wire: WireFormat::OpenAiChat,
        history: HistoryMode::Full,
    },
    // Perplexity — OpenAI-compatible shape, single-shot prompting
    ProviderSpec {
        vendor: Vendor::Perplexity,
        default_api_base: "https://api.perplexity.ai",
        default_model: "llama-3.1-sonar-small-128k-online",
        max_output_tokens: 4096,
        wire: WireFormat::OpenAiChat,
        history: HistoryMode::LatestOnly,
    },
];

// ─────────────────────────────────────────────
// Lookup functions
// ─────────────────────────────────────────────

/// The spec for a vendor.
pub fn find_by_vendor(vendor: Vendor) -> &'static ProviderSpec {
    match vendor {
        Vendor::Gemini => &PROVIDERS[0],
        Vendor::Groq => &PROVIDERS[1],
        Vendor::Claude => &PROVIDERS[2],
        Vendor::OpenAi => &PROVIDERS[3],
        Vendor::Perplexity => &PROVIDERS[4],
    }
}

/// API base for a vendor: config override, else the spec default.
/// Trailing slashes are trimmed so paths can be appended directly.
pub fn resolve_api_base(spec: &ProviderSpec, config: &ProviderConfig) -> String {
    config
        .api_base
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(spec.default_api_base)
        .trim_end_matches('/')
        .to_string()
}

/// Model for a vendor: config override, else the spec default.
pub fn resolve_model(spec: &ProviderSpec, config: &ProviderConfig) -> String {
    config
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(spec.default_model)
        .to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
