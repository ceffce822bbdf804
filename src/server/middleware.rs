//! Axum middleware for the OT HTTP binding.
//!
//! The middleware:
//! 1. Extracts the `Peer` and `Parents` headers from incoming requests
//! 2. Attaches them as an `Arc<RequestHeaders>` request extension
//! 3. Attaches the shared [`DocumentCoordinator`]
//!
//! # Usage
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use ot_axum_http::OtLayer;
//!
//! let layer = OtLayer::new();
//! let app = Router::new()
//!     .route("/documents/{id}", get(handler))
//!     .layer(middleware::from_fn(layer.middleware()));
//! ```

use super::config::ServerConfig;
use super::coordinator::DocumentCoordinator;
use crate::protocol::{self, constants::headers};
use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::Arc;

/// Protocol information extracted from request headers.
///
/// `parents` is kept raw so that handlers which need a base version can report a
/// malformed header instead of silently ignoring it.
#[derive(Clone, Debug, Default)]
pub struct RequestHeaders {
    /// `Peer` identifier of the submitting client, used for log correlation
    pub peer: Option<String>,

    /// Raw `Parents` header
    pub parents: Option<String>,
}

impl RequestHeaders {
    /// Parse the protocol headers of a request.
    #[must_use]
    pub fn from_headers(map: &http::HeaderMap) -> Self {
        let text = |name: &http::HeaderName| {
            map.get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        RequestHeaders {
            peer: text(&headers::PEER),
            parents: text(&headers::PARENTS),
        }
    }

    /// The base version carried by the `Parents` header, if any.
    ///
    /// # Errors
    ///
    /// Returns `HeaderParse` if the header is present but malformed.
    pub fn base_version(&self) -> crate::Result<Option<u64>> {
        self.parents
            .as_deref()
            .map(protocol::parse_version_header)
            .transpose()
    }
}

/// Axum middleware layer carrying the coordinator and its configuration.
///
/// Handlers extract `Extension<DocumentCoordinator>` and `Extension<Arc<RequestHeaders>>`.
#[derive(Clone)]
pub struct OtLayer {
    /// Shared coordinator (per-document serialization and the operation log)
    pub coordinator: DocumentCoordinator,
}

impl OtLayer {
    /// Layer over an in-memory coordinator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Layer over an in-memory coordinator with a custom configuration.
    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            coordinator: DocumentCoordinator::with_config(
                Arc::new(crate::store::MemoryStore::new()),
                config,
            ),
        }
    }

    /// Layer over an existing coordinator.
    #[must_use]
    pub fn with_coordinator(coordinator: DocumentCoordinator) -> Self {
        Self { coordinator }
    }

    /// The configuration used by the coordinator.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        self.coordinator.config()
    }

    /// Create the middleware function for use with `axum::middleware::from_fn`.
    #[must_use]
    pub fn middleware(
        &self,
    ) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
           + Send
           + Sync
           + Clone {
        let coordinator = self.coordinator.clone();

        move |mut req: Request, next: Next| {
            let coordinator = coordinator.clone();
            Box::pin(async move {
                let request_headers = RequestHeaders::from_headers(req.headers());
                req.extensions_mut().insert(Arc::new(request_headers));
                req.extensions_mut().insert(coordinator);
                next.run(req).await
            })
        }
    }
}

impl Default for OtLayer {
    fn default() -> Self {
        Self::new()
    }
}
