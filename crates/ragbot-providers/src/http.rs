//! Shared HTTP plumbing: one pooled client per adapter, a single send with
//! status/timeout classification, and JSON decoding into vendor types.

use std::time::Duration;

use anyhow::Context;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use ragbot_core::utils::truncate_string;
use ragbot_core::{CompletionError, Vendor};

/// Longest slice of an error body written to the logs.
const LOGGED_BODY_CHARS: usize = 500;

pub(crate) struct HttpTransport {
    client: reqwest::Client,
    vendor: Vendor,
    timeout: Duration,
}

impl HttpTransport {
    pub(crate) fn new(vendor: Vendor, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .with_context(|| format!("failed to build HTTP client for {vendor}"))?;

        Ok(Self {
            client,
            vendor,
            timeout,
        })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send one request and return the body of a 200 response.
    ///
    /// Anything other than 200 becomes `Http { status, body }`; timeouts
    /// become `Timeout`; every other transport failure is `Unknown`.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<String, CompletionError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = self.vendor.display_name(),
                status = %status,
                body = %truncate_string(&body, LOGGED_BODY_CHARS),
                "API error"
            );
            return Err(CompletionError::Http {
                vendor: self.vendor,
                status: status.as_u16(),
                body,
            });
        }

        response.text().await.map_err(|e| self.transport_error(e))
    }

    /// Decode a 200 body into the vendor's response type.
    pub(crate) fn decode<T: DeserializeOwned>(&self, body: &str) -> Result<T, CompletionError> {
        serde_json::from_str(body).map_err(|e| {
            error!(
                provider = self.vendor.display_name(),
                error = %e,
                "Failed to parse response"
            );
            self.malformed(format!("invalid JSON: {e}"))
        })
    }

    pub(crate) fn malformed(&self, detail: impl Into<String>) -> CompletionError {
        CompletionError::MalformedResponse {
            vendor: self.vendor,
            detail: detail.into(),
        }
    }

    /// Classify a reqwest error. The URL is stripped first: Gemini carries
    /// the API key in the query string.
    fn transport_error(&self, e: reqwest::Error) -> CompletionError {
        let e = e.without_url();
        if e.is_timeout() {
            warn!(
                provider = self.vendor.display_name(),
                timeout = ?self.timeout,
                "Request timed out"
            );
            CompletionError::Timeout {
                vendor: self.vendor,
                after: self.timeout,
            }
        } else {
            error!(provider = self.vendor.display_name(), error = %e, "HTTP request failed");
            CompletionError::Unknown {
                vendor: self.vendor,
                message: e.to_string(),
            }
        }
    }
}
