//! Client configuration.

use serde::Deserialize;

/// Configuration for [`OtClient`](super::OtClient).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Retries after the first attempt for retryable failures
    pub max_retries: u32,
    /// Base delay for exponential backoff, in milliseconds
    pub retry_delay_ms: u64,
    /// Per-request timeout, in milliseconds
    pub request_timeout_ms: u64,
    /// Log retries with `tracing`
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_ms: 30_000,
            enable_logging: true,
        }
    }
}
