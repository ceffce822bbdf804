//! HTTP client for the coordinator's HTTP binding.
//!
//! # Examples
//!
//! ```ignore
//! use ot_axum_http::{OtClient, Operation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OtClient::new("http://localhost:3000");
//!     let document = client.get_document("notes").await?;
//!
//!     let accepted = client
//!         .submit("notes", Operation::insert(0, "# "), document.version)
//!         .await?;
//!     println!("accepted as version {}", accepted.version);
//!     Ok(())
//! }
//! ```

use super::config::ClientConfig;
use super::utils::{exponential_backoff, status_error};
use crate::error::{OtError, Result};
use crate::protocol::{self, constants::headers};
use crate::types::{Accepted, Document, Operation, OperationRecord, Submission, VersionedContent};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Client for submitting operations to, and reading documents from, an OT server.
///
/// Failed requests are retried with exponential backoff when the server reports a
/// retryable status. Submissions are never retried after a transport failure, since the
/// server may already have accepted them; reads are.
#[derive(Clone)]
pub struct OtClient {
    client: reqwest::Client,
    base_url: String,
    config: Arc<ClientConfig>,
    peer: Option<String>,
}

impl OtClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_default();

        OtClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config: Arc::new(config),
            peer: None,
        }
    }

    /// Identify this client in the `Peer` header of every submission.
    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit `operation`, composed against `base_version`.
    pub async fn submit(
        &self,
        document_id: &str,
        operation: Operation,
        base_version: u64,
    ) -> Result<Accepted> {
        let url = format!("{}/documents/{}/operations", self.base_url, document_id);
        let submission = Submission {
            operation,
            base_version: Some(base_version),
        };

        self.send_with_retries(false, || {
            let mut request = self
                .client
                .post(&url)
                .header(
                    headers::PARENTS.as_str(),
                    protocol::format_version_header(base_version),
                )
                .json(&submission);
            if let Some(peer) = &self.peer {
                request = request.header(headers::PEER.as_str(), peer);
            }
            request
        })
        .await
    }

    /// Fetch the current document state.
    pub async fn get_document(&self, document_id: &str) -> Result<Document> {
        let url = format!("{}/documents/{}", self.base_url, document_id);
        self.send_with_retries(true, || self.client.get(&url)).await
    }

    /// Fetch log entries accepted after `after_version`.
    pub async fn history(
        &self,
        document_id: &str,
        after_version: u64,
    ) -> Result<Vec<OperationRecord>> {
        let url = format!(
            "{}/documents/{}/operations?after={}",
            self.base_url, document_id, after_version
        );
        self.send_with_retries(true, || self.client.get(&url)).await
    }

    /// Fetch the content of a document at a past version.
    pub async fn content_at(&self, document_id: &str, version: u64) -> Result<VersionedContent> {
        let url = format!(
            "{}/documents/{}/versions/{}",
            self.base_url, document_id, version
        );
        self.send_with_retries(true, || self.client.get(&url)).await
    }

    /// Send a request built by `build`, retrying retryable failures.
    ///
    /// Transport failures are only retried when `idempotent` is set.
    async fn send_with_retries<T, F>(&self, idempotent: bool, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match self.send_once(build()).await {
                Ok(value) => return Ok(value),
                Err(e)
                    if attempt < self.config.max_retries
                        && e.is_retryable()
                        && (idempotent || matches!(e, OtError::Status { .. })) =>
                {
                    let delay = exponential_backoff(attempt, self.config.retry_delay_ms);
                    if self.config.enable_logging {
                        tracing::warn!(
                            "Request failed (attempt {}), retrying after {:?}: {}",
                            attempt + 1,
                            delay,
                            e
                        );
                    }
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| OtError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| OtError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
