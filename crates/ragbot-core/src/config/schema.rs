//! Configuration schema.
//!
//! Hierarchy: `Config` → `ChatConfig`, `ProvidersConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Persona, ProviderCredential, SamplingConfig, Vendor};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.ragbot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub chat: ChatConfig,
    pub providers: ProvidersConfig,
}

impl Config {
    /// Check that a chat on `vendor` can start: valid sampling parameters,
    /// a usable timeout, and a credential for that vendor.
    pub fn check_ready(&self, vendor: Vendor) -> Result<(), ConfigError> {
        self.chat.sampling()?;
        if self.chat.request_timeout_secs == 0 {
            return Err(ConfigError::Timeout);
        }
        if self.providers.credential(vendor).is_none() {
            return Err(ConfigError::missing_credential(vendor));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// Default conversation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Vendor used for new sessions.
    pub vendor: Vendor,
    /// Built-in system prompt to start with.
    pub persona: Persona,
    /// Custom system prompt. Overrides the persona prompt when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Assistant turn seeded at session start and after every clear.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f64,
    /// Maximum tokens to generate per response.
    pub max_output_tokens: u32,
    /// Per-request timeout applied to every vendor.
    pub request_timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            vendor: Vendor::Groq,
            persona: Persona::Support,
            system_prompt: None,
            welcome_message: Some("Hi! How can I help you today?".to_string()),
            temperature: 0.7,
            max_output_tokens: 1024,
            request_timeout_secs: 30,
        }
    }
}

impl ChatConfig {
    /// Validated sampling parameters.
    pub fn sampling(&self) -> Result<SamplingConfig, ConfigError> {
        Ok(SamplingConfig::new(self.temperature, self.max_output_tokens)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single vendor (API key, base URL, model).
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides the vendor default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Model identifier (overrides the vendor default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &if self.is_configured() { "***" } else { "" })
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl ProviderConfig {
    /// Whether this vendor has a non-blank API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// The API key as a credential, or `None` when blank.
    pub fn credential(&self) -> Option<ProviderCredential> {
        ProviderCredential::new(self.api_key.as_str())
    }
}

/// All vendor configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: ProviderConfig,
    #[serde(default)]
    pub groq: ProviderConfig,
    #[serde(default)]
    pub claude: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub perplexity: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, vendor: Vendor) -> &ProviderConfig {
        match vendor {
            Vendor::Gemini => &self.gemini,
            Vendor::Groq => &self.groq,
            Vendor::Claude => &self.claude,
            Vendor::OpenAi => &self.openai,
            Vendor::Perplexity => &self.perplexity,
        }
    }

    pub fn get_mut(&mut self, vendor: Vendor) -> &mut ProviderConfig {
        match vendor {
            Vendor::Gemini => &mut self.gemini,
            Vendor::Groq => &mut self.groq,
            Vendor::Claude => &mut self.claude,
            Vendor::OpenAi => &mut self.openai,
            Vendor::Perplexity => &mut self.perplexity,
        }
    }

    /// Credential for `vendor`, if one is configured.
    pub fn credential(&self, vendor: Vendor) -> Option<ProviderCredential> {
        self.get(vendor).credential()
    }

    /// Vendors with a configured key, in display order.
    pub fn configured_vendors(&self) -> Vec<Vendor> {
        Vendor::ALL
            .into_iter()
            .filter(|v| self.get(*v).is_configured())
            .collect()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chat.vendor, Vendor::Groq);
        assert_eq!(config.chat.persona, Persona::Support);
        assert_eq!(config.chat.temperature, 0.7);
        assert_eq!(config.chat.request_timeout_secs, 30);
        assert!(config.providers.configured_vendors().is_empty());
    }

    #[test]
    fn test_config_from_json_camel_case() {
        let json = r#"{
            "chat": {
                "vendor": "claude",
                "persona": "standard",
                "systemPrompt": "Be brief.",
                "maxOutputTokens": 512,
                "requestTimeoutSecs": 10
            },
            "providers": {
                "claude": { "apiKey": "sk-ant-1", "model": "claude-3-haiku-20240307" },
                "gemini": { "apiKey": "g-1", "apiBase": "http://localhost:9000" }
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.chat.vendor, Vendor::Claude);
        assert_eq!(config.chat.persona, Persona::Standard);
        assert_eq!(config.chat.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(config.chat.max_output_tokens, 512);
        assert_eq!(config.chat.request_timeout(), Duration::from_secs(10));
        // Unset field keeps its default
        assert_eq!(config.chat.temperature, 0.7);
        assert_eq!(
            config.providers.claude.model.as_deref(),
            Some("claude-3-haiku-20240307")
        );
        assert_eq!(
            config.providers.gemini.api_base.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(
            config.providers.configured_vendors(),
            vec![Vendor::Gemini, Vendor::Claude]
        );
    }

    #[test]
    fn test_config_json_uses_camel_case() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["chat"].get("maxOutputTokens").is_some());
        assert!(json["chat"].get("max_output_tokens").is_none());
        assert_eq!(json["chat"]["vendor"], "groq");
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let cfg = ProviderConfig {
            api_key: "   ".into(),
            ..Default::default()
        };
        assert!(!cfg.is_configured());
        assert!(cfg.credential().is_none());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let cfg = ProviderConfig {
            api_key: "sk-secret-value".into(),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("sk-secret-value"));
    }

    #[test]
    fn test_check_ready() {
        let mut config = Config::default();
        assert_eq!(
            config.check_ready(Vendor::Groq).unwrap_err(),
            ConfigError::missing_credential(Vendor::Groq)
        );

        config.providers.groq.api_key = "gsk-1".into();
        assert!(config.check_ready(Vendor::Groq).is_ok());

        config.chat.temperature = 3.0;
        assert!(matches!(
            config.check_ready(Vendor::Groq),
            Err(ConfigError::Sampling(_))
        ));

        config.chat.temperature = 0.3;
        config.chat.request_timeout_secs = 0;
        assert_eq!(
            config.check_ready(Vendor::Groq).unwrap_err(),
            ConfigError::Timeout
        );
    }

    #[test]
    fn test_get_mut_targets_vendor() {
        let mut providers = ProvidersConfig::default();
        providers.get_mut(Vendor::Perplexity).api_key = "pplx-1".into();
        assert!(providers.perplexity.is_configured());
        assert!(providers.credential(Vendor::Perplexity).is_some());
        assert!(providers.credential(Vendor::OpenAi).is_none());
    }
}
