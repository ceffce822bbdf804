//! Error types for the OT engine, its store, and the HTTP binding.
//!
//! Every fallible operation in the crate returns [`Result<T>`], an alias over [`OtError`].
//! The variants follow the engine's failure taxonomy:
//!
//! | Variant | Surfaced to caller | Retryable | HTTP status |
//! |---------|--------------------|-----------|-------------|
//! | [`OtError::DocumentNotFound`] | yes | no | 404 |
//! | [`OtError::InvalidBaseVersion`] | yes | no | 409 |
//! | [`OtError::Persistence`] | yes | yes | 503 |
//! | [`OtError::Snapshot`] | no (logged) | - | 500 |
//! | [`OtError::InvalidOperation`] | yes | no | 400 |
//! | [`OtError::UnknownVersion`] | yes | no | 404 |
//!
//! Malformed-but-typed operations (an empty insert, a delete running past the end of the
//! document) are *not* errors: they degrade to no-op edits and still consume a version.

use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http::{header, StatusCode};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OtError>;

/// Errors produced by the OT engine and its collaborators.
#[derive(Debug, Error)]
pub enum OtError {
    /// The target document row does not exist. Nothing was persisted.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// A document with this id already exists.
    #[error("document already exists: {0}")]
    DocumentExists(String),

    /// The client's base version is ahead of the document. Nothing was persisted.
    #[error("base version {base_version} is ahead of current version {current_version}")]
    InvalidBaseVersion {
        /// Version the client claims to have composed against
        base_version: u64,
        /// Version of the document at acceptance time
        current_version: u64,
    },

    /// A historical version was requested that the document has not reached.
    #[error("version {version} is beyond current version {current_version}")]
    UnknownVersion {
        /// Requested version
        version: u64,
        /// Version of the document
        current_version: u64,
    },

    /// The atomic commit failed. Nothing was persisted; the caller may retry with a
    /// refreshed base version.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Writing a snapshot failed. Never surfaced from a submission.
    #[error("snapshot failure: {0}")]
    Snapshot(String),

    /// The operation payload could not be decoded at the transport boundary.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A protocol header could not be parsed.
    #[error("header parse error: {0}")]
    HeaderParse(String),

    /// Transport-level HTTP failure (client side).
    #[error("http error: {0}")]
    Http(String),

    /// The server answered with an error status (client side).
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message reported by the server
        message: String,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OtError {
    /// Whether the failed request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(_) | Self::Http(_) => true,
            Self::Status { status, .. } => crate::client::is_retryable_status(*status),
            _ => false,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DocumentNotFound(_) | Self::UnknownVersion { .. } => StatusCode::NOT_FOUND,
            Self::DocumentExists(_) | Self::InvalidBaseVersion { .. } => StatusCode::CONFLICT,
            Self::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidOperation(_) | Self::HeaderParse(_) | Self::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Snapshot(_) | Self::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OtError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        let mut response = Response::new(Body::from(body.to_string()));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            OtError::DocumentNotFound("d".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            OtError::InvalidBaseVersion {
                base_version: 4,
                current_version: 2
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            OtError::Persistence("disk".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            OtError::InvalidOperation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_retryable() {
        assert!(OtError::Persistence("disk".into()).is_retryable());
        assert!(OtError::Status {
            status: 503,
            message: "busy".into()
        }
        .is_retryable());
        assert!(!OtError::DocumentNotFound("d".into()).is_retryable());
        assert!(!OtError::InvalidBaseVersion {
            base_version: 1,
            current_version: 0
        }
        .is_retryable());
    }

    #[test]
    fn test_display() {
        let err = OtError::InvalidBaseVersion {
            base_version: 7,
            current_version: 3,
        };
        assert_eq!(
            err.to_string(),
            "base version 7 is ahead of current version 3"
        );
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = OtError::DocumentNotFound("doc-9".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["error"], "document not found: doc-9");
    }
}
