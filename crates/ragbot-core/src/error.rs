//! Completion failures — the normalized error taxonomy every adapter maps to.

use std::time::Duration;

use thiserror::Error;

use crate::types::{SamplingError, Vendor};

/// Outcome of one completion call: the answer text, or why there is none.
pub type CompletionResult = Result<String, CompletionError>;

/// Why a completion produced no answer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("no API key configured for {vendor}")]
    AuthMissing { vendor: Vendor },

    /// Non-200 status. `body` is the raw response body, kept for diagnostics.
    #[error("{vendor} API returned HTTP {status}")]
    Http {
        vendor: Vendor,
        status: u16,
        body: String,
    },

    #[error("{vendor} did not respond within {after:?}")]
    Timeout { vendor: Vendor, after: Duration },

    #[error("unexpected response shape from {vendor}: {detail}")]
    MalformedResponse { vendor: Vendor, detail: String },

    #[error("request to {vendor} failed: {message}")]
    Unknown { vendor: Vendor, message: String },
}

/// Fieldless discriminant of [`CompletionError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    AuthMissing,
    HttpError,
    Timeout,
    MalformedResponse,
    Unknown,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::AuthMissing => "auth_missing",
            FailureKind::HttpError => "http_error",
            FailureKind::Timeout => "timeout",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl CompletionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CompletionError::AuthMissing { .. } => FailureKind::AuthMissing,
            CompletionError::Http { .. } => FailureKind::HttpError,
            CompletionError::Timeout { .. } => FailureKind::Timeout,
            CompletionError::MalformedResponse { .. } => FailureKind::MalformedResponse,
            CompletionError::Unknown { .. } => FailureKind::Unknown,
        }
    }

    pub fn vendor(&self) -> Vendor {
        match self {
            CompletionError::AuthMissing { vendor }
            | CompletionError::Http { vendor, .. }
            | CompletionError::Timeout { vendor, .. }
            | CompletionError::MalformedResponse { vendor, .. }
            | CompletionError::Unknown { vendor, .. } => *vendor,
        }
    }

    /// Only a missing key blocks the session; everything else can be resubmitted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompletionError::AuthMissing { .. })
    }

    /// Text shown to the user as the assistant's reply.
    pub fn user_message(&self) -> String {
        match self {
            CompletionError::AuthMissing { vendor } => format!(
                "⚠️ No API key configured for {vendor}. Set {} or add it to the config file.",
                vendor.env_key()
            ),
            CompletionError::Http { vendor, status, .. } => format!(
                "⚠️ {vendor} API error (HTTP {status}). Please try again."
            ),
            CompletionError::Timeout { vendor, after } => format!(
                "⚠️ {vendor} did not respond within {} seconds. Please try again.",
                after.as_secs_f64()
            ),
            CompletionError::MalformedResponse { vendor, .. } => format!(
                "⚠️ {vendor} returned a response without an answer. Please try again."
            ),
            CompletionError::Unknown { message, .. } => {
                format!("⚠️ Something went wrong: {message}")
            }
        }
    }
}

/// Configuration that cannot start a chat session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no API key for {vendor}: set {env_key} or providers.{name}.apiKey in the config file")]
    MissingCredential {
        vendor: Vendor,
        env_key: &'static str,
        name: &'static str,
    },

    #[error("invalid sampling parameters: {0}")]
    Sampling(#[from] SamplingError),

    #[error("request timeout must be at least one second")]
    Timeout,
}

impl ConfigError {
    pub fn missing_credential(vendor: Vendor) -> Self {
        ConfigError::MissingCredential {
            vendor,
            env_key: vendor.env_key(),
            name: vendor.as_str(),
        }
    }
}
