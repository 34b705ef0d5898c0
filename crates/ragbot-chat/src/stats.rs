//! Per-process request statistics.
//!
//! Counters describe what the session has sent, not what the transcript
//! currently holds, so they survive `clear()`.

use std::collections::BTreeMap;
use std::time::Duration;

use ragbot_core::{CompletionResult, FailureKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    requests: u64,
    successes: u64,
    failures: BTreeMap<FailureKind, u64>,
    total_latency: Duration,
    last_latency: Option<Duration>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one completed request.
    pub fn record(&mut self, result: &CompletionResult, latency: Duration) {
        self.requests += 1;
        match result {
            Ok(_) => self.successes += 1,
            Err(e) => *self.failures.entry(e.kind()).or_insert(0) += 1,
        }
        self.total_latency += latency;
        self.last_latency = Some(latency);
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn failures_of(&self, kind: FailureKind) -> u64 {
        self.failures.get(&kind).copied().unwrap_or(0)
    }

    /// Failure counts by kind, in a stable order.
    pub fn failure_breakdown(&self) -> impl Iterator<Item = (FailureKind, u64)> + '_ {
        self.failures.iter().map(|(k, v)| (*k, *v))
    }

    /// Fraction of requests that succeeded, `None` before the first request.
    pub fn success_rate(&self) -> Option<f64> {
        (self.requests > 0).then(|| self.successes as f64 / self.requests as f64)
    }

    pub fn average_latency(&self) -> Option<Duration> {
        u32::try_from(self.requests)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| self.total_latency / n)
    }

    pub fn last_latency(&self) -> Option<Duration> {
        self.last_latency
    }
}
