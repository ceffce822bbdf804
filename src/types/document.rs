//! Persisted entities: the canonical document row, log entries, and snapshots.

use super::Operation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The canonical row for a document.
///
/// `version` always equals the number of operations ever accepted for the document.
/// The row is a cache over the operation log and is only mutated through an atomic commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Current content
    pub content: String,
    /// Number of accepted operations
    pub version: u64,
    /// When the document was created
    pub created_at: DateTime<Utc>,
    /// When the last operation was accepted
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// A fresh document at version 0.
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One accepted operation in a document's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Unique row id
    pub id: Uuid,
    /// Owning document
    pub document_id: String,
    /// Version produced by accepting this operation (1-based log position)
    pub version: u64,
    /// Version the submitting client composed against
    pub base_version: u64,
    /// The operation as transformed and applied
    pub operation: Operation,
    /// Acceptance time
    pub created_at: DateTime<Utc>,
}

impl OperationRecord {
    /// Build a log entry for `operation` accepted at `version`.
    pub fn new(document_id: &str, version: u64, base_version: u64, operation: Operation) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document_id.to_string(),
            version,
            base_version,
            operation,
            created_at: Utc::now(),
        }
    }
}

/// A full-content checkpoint of a document at a given version.
///
/// Snapshots are never authoritative; they bound the cost of replaying the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unique row id
    pub id: Uuid,
    /// Owning document
    pub document_id: String,
    /// Version the content corresponds to
    pub version: u64,
    /// Full content at `version`
    pub content: String,
    /// Capture time
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Capture `content` as the state of `document_id` at `version`.
    pub fn new(document_id: &str, version: u64, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document_id.to_string(),
            version,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
