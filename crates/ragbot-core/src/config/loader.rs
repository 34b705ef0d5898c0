//! Config loader — reads `~/.ragbot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.ragbot/config.json`
//! 3. Environment variables (override JSON):
//!    the vendor key names (`GOOGLE_API_KEY`, `GROQ_API_KEY`, ...) and
//!    `RAGBOT_<SECTION>__<FIELD>` for everything else.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;
use crate::types::Vendor;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    let config = load_config_from_path(&config_path);
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment overrides on top of a loaded config.
///
/// `lookup` resolves a variable name to its value.
///
/// Supported overrides:
/// - `GOOGLE_API_KEY`, `GROQ_API_KEY`, `CLAUDE_API_KEY`, `OPENAI_API_KEY`,
///   `PERPLEXITY_API_KEY` → `providers.<name>.api_key`
/// - `RAGBOT_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
/// - `RAGBOT_PROVIDERS__<NAME>__MODEL` → `providers.<name>.model`
/// - `RAGBOT_CHAT__VENDOR` → `chat.vendor`
/// - `RAGBOT_CHAT__TEMPERATURE` → `chat.temperature`
/// - `RAGBOT_CHAT__MAX_OUTPUT_TOKENS` → `chat.max_output_tokens`
/// - `RAGBOT_CHAT__REQUEST_TIMEOUT_SECS` → `chat.request_timeout_secs`
fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    for vendor in Vendor::ALL {
        let provider = config.providers.get_mut(vendor);
        if let Some(val) = lookup(vendor.env_key()) {
            // Blank values are ignored so an empty export can't wipe a file key
            if !val.trim().is_empty() {
                provider.api_key = val;
            }
        }

        let name = vendor.as_str().to_uppercase();
        if let Some(val) = lookup(&format!("RAGBOT_PROVIDERS__{name}__API_BASE")) {
            provider.api_base = Some(val);
        }
        if let Some(val) = lookup(&format!("RAGBOT_PROVIDERS__{name}__MODEL")) {
            provider.model = Some(val);
        }
    }

    if let Some(val) = lookup("RAGBOT_CHAT__VENDOR") {
        match val.parse::<Vendor>() {
            Ok(v) => config.chat.vendor = v,
            Err(e) => warn!("Ignoring RAGBOT_CHAT__VENDOR: {}", e),
        }
    }
    if let Some(val) = lookup("RAGBOT_CHAT__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.chat.temperature = t;
        }
    }
    if let Some(val) = lookup("RAGBOT_CHAT__MAX_OUTPUT_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.chat.max_output_tokens = n;
        }
    }
    if let Some(val) = lookup("RAGBOT_CHAT__REQUEST_TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.chat.request_timeout_secs = n;
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
