//! Response builders for accepted operations and document state.
//!
//! Every successful response carries the version of the state it describes in a `Version`
//! header; responses to a submission also carry the submitter's base version in `Parents`:
//!
//! ```text
//! HTTP/1.1 200 OK
//! Version: "12"
//! Parents: "9"
//! Content-Type: application/json
//!
//! {"operation":{"type":"insert","position":14,"text":"!"},"version":12}
//! ```

use crate::error::Result;
use crate::protocol::{self, constants::headers};
use crate::types::Document;
use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;

/// Builder for versioned JSON responses.
///
/// # Examples
///
/// ```ignore
/// use ot_axum_http::server::UpdateResponse;
///
/// let response = UpdateResponse::new(StatusCode::OK)
///     .with_version(12)
///     .with_parents(9)
///     .with_json(&accepted)?
///     .build();
/// ```
pub struct UpdateResponse {
    status: StatusCode,
    headers: BTreeMap<String, String>,
    body: Option<Bytes>,
}

impl UpdateResponse {
    /// Create a new response builder with the given status code.
    pub fn new(status: StatusCode) -> Self {
        UpdateResponse {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Set the `Version` header.
    pub fn with_version(mut self, version: u64) -> Self {
        self.headers.insert(
            headers::VERSION.as_str().to_string(),
            protocol::format_version_header(version),
        );
        self
    }

    /// Set the `Parents` header
    pub fn with_parents(mut self, version: u64) -> Self {
        self.headers.insert(
            headers::PARENTS.as_str().to_string(),
            protocol::format_version_header(version),
        );
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(value)?));
        self.headers.insert(
            header::CONTENT_TYPE.as_str().to_string(),
            "application/json".to_string(),
        );
        Ok(self)
    }

    /// Build the response
    pub fn build(self) -> Response {
        let mut response = Response::builder().status(self.status);

        for (key, value) in &self.headers {
            if let Ok(header_value) = value.parse::<HeaderValue>() {
                response = response.header(key, header_value);
            }
        }

        match self.body {
            Some(body) => response
                .header(header::CONTENT_LENGTH, body.len())
                .body(Body::from(body))
                .unwrap_or_else(|_| Response::default()),
            None => response
                .body(Body::empty())
                .unwrap_or_else(|_| Response::default()),
        }
    }
}

/// Document state as a versioned JSON response
impl IntoResponse for Document {
    fn into_response(self) -> Response {
        let version = self.version;
        match UpdateResponse::new(StatusCode::OK)
            .with_version(version)
            .with_json(&self)
        {
            Ok(builder) => builder.build(),
            Err(e) => e.into_response(),
        }
    }
}
