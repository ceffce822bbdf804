//! Persistence for documents, the operation log, and snapshots.
//!
//! The [`DocumentStore`] trait is the seam between the coordinator and whatever durable
//! storage backs it. The operation log is the source of truth; the document row is a cache
//! of the log's head that [`DocumentStore::commit`] updates in the same atomic step as the
//! log append, so `document.version == log length` holds at every observable instant.
//!
//! [`MemoryStore`] is the in-process implementation.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::merge;
use crate::types::{Document, OperationRecord, Snapshot};
use async_trait::async_trait;

/// One accepted operation together with the document state it produces.
///
/// A store applies a commit all-or-nothing: either the log gains `record` and the document
/// row becomes `(content, record.version)`, or nothing changes.
#[derive(Debug, Clone)]
pub struct Commit {
    /// Document being modified
    pub document_id: String,
    /// Version the document must still be at for the commit to apply
    pub expected_version: u64,
    /// New log entry; `record.version` must be `expected_version + 1`
    pub record: OperationRecord,
    /// Document content after applying `record.operation`
    pub content: String,
}

/// Durable storage used by the coordinator.
///
/// Implementations must make [`commit`](DocumentStore::commit) atomic and must reject a
/// commit whose `expected_version` no longer matches the stored document, so that a log
/// position is never written twice.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document row. Fails with `DocumentExists` if the id is taken.
    ///
    /// Non-empty content must be recorded as a version-0 snapshot in the same atomic write,
    /// since replay has no other base for it.
    async fn create_document(&self, document: Document) -> Result<Document>;

    /// Load the canonical document row.
    async fn load_document(&self, document_id: &str) -> Result<Option<Document>>;

    /// Log entries with `version > after_version`, in ascending version order.
    async fn operations_since(
        &self,
        document_id: &str,
        after_version: u64,
    ) -> Result<Vec<OperationRecord>>;

    /// Log entries with `after_version < version <= up_to`, in ascending version order.
    async fn operations_between(
        &self,
        document_id: &str,
        after_version: u64,
        up_to: u64,
    ) -> Result<Vec<OperationRecord>> {
        let mut records = self.operations_since(document_id, after_version).await?;
        records.retain(|record| record.version <= up_to);
        Ok(records)
    }

    /// Append a log entry and update the document row atomically.
    async fn commit(&self, commit: Commit) -> Result<Document>;

    /// Store a snapshot.
    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()>;

    /// The most recent snapshot at or before `version`.
    async fn latest_snapshot(&self, document_id: &str, version: u64) -> Result<Option<Snapshot>>;
}

/// Reconstruct the content of `document_id` at `version` from the nearest snapshot at or
/// before it (or from empty content) plus the log.
pub async fn replay<S>(store: &S, document_id: &str, version: u64) -> Result<String>
where
    S: DocumentStore + ?Sized,
{
    let (base_version, base_content) = match store.latest_snapshot(document_id, version).await? {
        Some(snapshot) => (snapshot.version, snapshot.content),
        None => (0, String::new()),
    };

    let records = store
        .operations_between(document_id, base_version, version)
        .await?;

    Ok(merge::apply_all(
        &base_content,
        records.iter().map(|record| &record.operation),
    ))
}
