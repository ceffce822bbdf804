//! Core value types shared by the engine, the store, and the HTTP binding.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Operation`] | A single insert or delete edit intent |
//! | [`Document`] | Canonical document row (content + version) |
//! | [`OperationRecord`] | One entry of a document's append-only operation log |
//! | [`Snapshot`] | Full-content checkpoint at a given version |
//! | [`Submission`] | Wire form of a client submission |
//! | [`Accepted`] | Version-stamped result safe to broadcast |

mod document;
mod operation;

pub use document::{Document, OperationRecord, Snapshot};
pub use operation::Operation;

use serde::{Deserialize, Serialize};

/// An operation submitted by a client, as received from the transport.
///
/// `base_version` may be omitted on the wire when the transport carries it elsewhere
/// (the HTTP binding accepts it from the `Parents` header).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// The edit as composed by the client
    pub operation: Operation,
    /// Document version the client had loaded when composing the edit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<u64>,
}

/// Result of a successful submission: the operation as it was applied and the version it
/// produced. Transports broadcast this verbatim to the document's other subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    /// The reconciled operation, exactly as applied to the canonical content
    pub operation: Operation,
    /// Version produced by accepting the operation
    pub version: u64,
}

/// Content of a document at a particular version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedContent {
    /// The version
    pub version: u64,
    /// Content at that version
    pub content: String,
}
