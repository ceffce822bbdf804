//! HTTP handlers and router for the coordinator.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/documents/{id}/operations` | Submit an operation |
//! | `GET` | `/documents/{id}/operations?after=n` | Log entries after version `n` |
//! | `GET` | `/documents/{id}` | Current document state |
//! | `GET` | `/documents/{id}/versions/{n}` | Content at version `n` |
//!
//! A submission body is a JSON [`Submission`]. The base version is taken from the body's
//! `base_version` field, or from the `Parents` header when the body omits it. The body is
//! validated here, before anything reaches the coordinator: an unknown operation type, a
//! missing field, or a negative number is rejected with `400 Bad Request`.

use super::coordinator::DocumentCoordinator;
use super::middleware::{OtLayer, RequestHeaders};
use super::send_update::UpdateResponse;
use crate::error::{OtError, Result};
use crate::types::{Document, OperationRecord, Submission, VersionedContent};
use axum::{
    extract::{Extension, Path, Query},
    middleware,
    response::Response,
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the router for `layer`'s coordinator.
pub fn router(layer: &OtLayer) -> Router {
    Router::new()
        .route("/documents/{id}", get(get_document))
        .route(
            "/documents/{id}/operations",
            get(get_history).post(submit_operation),
        )
        .route("/documents/{id}/versions/{version}", get(get_version))
        .layer(middleware::from_fn(layer.middleware()))
        .layer(TraceLayer::new_for_http())
}

/// `POST /documents/{id}/operations`
pub async fn submit_operation(
    Path(document_id): Path<String>,
    Extension(coordinator): Extension<DocumentCoordinator>,
    Extension(request_headers): Extension<Arc<RequestHeaders>>,
    body: Bytes,
) -> Result<Response> {
    let limit = coordinator.config().max_operation_bytes;
    if body.len() > limit {
        return Err(OtError::InvalidOperation(format!(
            "body of {} bytes exceeds the {} byte limit",
            body.len(),
            limit
        )));
    }

    let submission: Submission = serde_json::from_slice(&body)
        .map_err(|e| OtError::InvalidOperation(e.to_string()))?;

    let base_version = match submission.base_version {
        Some(version) => version,
        None => request_headers.base_version()?.ok_or_else(|| {
            OtError::InvalidOperation(
                "missing base version: set `base_version` or the Parents header".to_string(),
            )
        })?,
    };

    tracing::debug!(
        document_id = %document_id,
        peer = request_headers.peer.as_deref().unwrap_or("-"),
        base_version,
        "received submission"
    );

    let accepted = coordinator
        .submit_operation(&document_id, submission.operation, base_version)
        .await?;

    Ok(UpdateResponse::new(StatusCode::OK)
        .with_version(accepted.version)
        .with_parents(base_version)
        .with_json(&accepted)?
        .build())
}

/// `GET /documents/{id}`
pub async fn get_document(
    Path(document_id): Path<String>,
    Extension(coordinator): Extension<DocumentCoordinator>,
) -> Result<Document> {
    coordinator.document(&document_id).await
}

/// Query string of the history endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Return entries with a version greater than this (default 0)
    #[serde(default)]
    pub after: u64,
}

/// `GET /documents/{id}/operations?after=n`
pub async fn get_history(
    Path(document_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    Extension(coordinator): Extension<DocumentCoordinator>,
) -> Result<Json<Vec<OperationRecord>>> {
    Ok(Json(coordinator.history(&document_id, query.after).await?))
}

/// `GET /documents/{id}/versions/{version}`
pub async fn get_version(
    Path((document_id, version)): Path<(String, u64)>,
    Extension(coordinator): Extension<DocumentCoordinator>,
) -> Result<Response> {
    let content: VersionedContent = coordinator.content_at(&document_id, version).await?;
    Ok(UpdateResponse::new(StatusCode::OK)
        .with_version(content.version)
        .with_json(&content)?
        .build())
}
