//! HTTP client for the OT server.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch   - OtClient and HTTP operations
//! ├── config  - Client configuration
//! └── utils   - Backoff and status classification
//! ```
//!
//! # Examples
//!
//! ```
//! use ot_axum_http::client::{ClientConfig, OtClient};
//!
//! let client = OtClient::new("http://localhost:3000");
//! assert_eq!(client.config().max_retries, 3);
//!
//! // Fail fast in interactive editors.
//! let config = ClientConfig {
//!     max_retries: 1,
//!     retry_delay_ms: 250,
//!     ..ClientConfig::default()
//! };
//! let client = OtClient::with_config("http://localhost:3000", config).with_peer("editor-1");
//! ```
//!
//! ```
//! use ot_axum_http::client::{exponential_backoff, is_retryable_status};
//! use std::time::Duration;
//!
//! assert!(is_retryable_status(503));
//! assert!(!is_retryable_status(404));
//! assert_eq!(exponential_backoff(2, 100), Duration::from_millis(400));
//! ```

mod config;
mod fetch;
mod utils;

pub use config::ClientConfig;
pub use fetch::OtClient;
pub use utils::*;
