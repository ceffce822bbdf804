//! Per-document coordination of concurrent submissions.
//!
//! The [`DocumentCoordinator`] is the only writer of document state. Submissions for the
//! same document are serialized by a per-document async mutex, held for the whole
//! reconcile / apply / commit / snapshot sequence; submissions for different documents
//! never contend. This serialization is what makes the version counter a gap-free total
//! order.
//!
//! # Submission protocol
//!
//! 1. Acquire the document's lock.
//! 2. Load the document row (`DocumentNotFound` if absent).
//! 3. Reject a base version ahead of the document (`InvalidBaseVersion`).
//! 4. Fetch every log entry after the base version, ascending.
//! 5. Clamp the incoming operation to the content at its base version, then transform it
//!    through those entries.
//! 6. Clamp the result to the current content and apply it.
//! 7. Commit the log entry and the new document row atomically.
//! 8. Every `snapshot_interval` versions, write a snapshot (failures are logged only).
//! 9. Release the lock and return the operation and version to broadcast.

use super::config::ServerConfig;
use crate::error::{OtError, Result};
use crate::merge;
use crate::store::{self, Commit, DocumentStore, MemoryStore};
use crate::types::{Accepted, Document, Operation, OperationRecord, Snapshot, VersionedContent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of recomputing a document's head content from its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Version of the document row
    pub version: u64,
    /// Content recomputed from snapshots and the log
    pub content: String,
    /// Whether the cached document row agreed with the recomputed content
    pub matches_cache: bool,
}

/// Serializes and applies operations for every document in a store.
///
/// Cloning creates a new handle to the same store and lock registry, so clones can be
/// handed to different tasks and handlers.
///
/// # Examples
///
/// ```
/// use ot_axum_http::{DocumentCoordinator, Operation};
///
/// # tokio_test::block_on(async {
/// let coordinator = DocumentCoordinator::in_memory();
/// coordinator.create_document("doc", "Notes", "hello").await.unwrap();
///
/// // Two clients edit concurrently from version 0.
/// coordinator.submit_operation("doc", Operation::insert(5, " world"), 0).await.unwrap();
/// let accepted = coordinator.submit_operation("doc", Operation::insert(0, ">> "), 0).await.unwrap();
///
/// assert_eq!(accepted.version, 2);
/// assert_eq!(coordinator.document("doc").await.unwrap().content, ">> hello world");
/// # });
/// ```
#[derive(Clone)]
pub struct DocumentCoordinator {
    store: Arc<dyn DocumentStore>,
    config: Arc<ServerConfig>,
    /// Document id -> lock serializing its submissions, present only while in use.
    locks: Arc<Mutex<LockRegistry>>,
}

type LockRegistry = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// Exclusive hold on one document. Dropping it releases the lock and removes the registry
/// entry once no other task holds or waits for it.
struct DocumentGuard {
    locks: Arc<Mutex<LockRegistry>>,
    document_id: String,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for DocumentGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock();
        if locks
            .get(&self.document_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.document_id);
        }
    }
}

impl DocumentCoordinator {
    /// Coordinator over `store` with the default configuration.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, ServerConfig::default())
    }

    /// Coordinator over `store` with a custom configuration.
    pub fn with_config(store: Arc<dyn DocumentStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Coordinator over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The configuration in use.
    #[inline]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The backing store.
    #[inline]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    async fn lock_document(&self, document_id: &str) -> DocumentGuard {
        let lock = self
            .locks
            .lock()
            .entry(document_id.to_string())
            .or_default()
            .clone();
        DocumentGuard {
            locks: self.locks.clone(),
            document_id: document_id.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    async fn require_document(&self, document_id: &str) -> Result<Document> {
        self.store
            .load_document(document_id)
            .await?
            .ok_or_else(|| OtError::DocumentNotFound(document_id.to_string()))
    }

    // ========== Document Lifecycle ==========

    /// Create a document at version 0.
    ///
    /// The store records non-empty initial content as a version-0 snapshot in the same
    /// write as the document row; it is the base that log replay starts from.
    pub async fn create_document(
        &self,
        document_id: &str,
        title: &str,
        initial_content: &str,
    ) -> Result<Document> {
        let _guard = self.lock_document(document_id).await;

        let document = self
            .store
            .create_document(Document::new(document_id, title, initial_content))
            .await?;

        tracing::info!(document_id, "created document");
        Ok(document)
    }

    /// The current document row.
    pub async fn document(&self, document_id: &str) -> Result<Document> {
        self.require_document(document_id).await
    }

    /// Log entries accepted after `after_version`, ascending.
    pub async fn history(
        &self,
        document_id: &str,
        after_version: u64,
    ) -> Result<Vec<OperationRecord>> {
        let document = self.require_document(document_id).await?;
        if after_version > document.version {
            return Err(OtError::UnknownVersion {
                version: after_version,
                current_version: document.version,
            });
        }
        self.store.operations_since(document_id, after_version).await
    }

    // ========== Submissions ==========

    /// Reconcile `operation`, composed against `base_version`, with everything accepted
    /// since, then apply and commit it.
    ///
    /// Returns the operation exactly as applied together with the version it produced.
    ///
    /// # Errors
    ///
    /// - [`OtError::DocumentNotFound`] if the document does not exist
    /// - [`OtError::InvalidBaseVersion`] if `base_version` is ahead of the document
    /// - [`OtError::Persistence`] if the commit fails; nothing is persisted and the caller
    ///   may retry with a refreshed base version
    #[tracing::instrument(level = "debug", skip(self, operation), fields(kind = operation.kind()))]
    pub async fn submit_operation(
        &self,
        document_id: &str,
        operation: Operation,
        base_version: u64,
    ) -> Result<Accepted> {
        let _guard = self.lock_document(document_id).await;

        let document = self.require_document(document_id).await?;
        if base_version > document.version {
            tracing::warn!(
                current_version = document.version,
                "rejected submission with base version ahead of document"
            );
            return Err(OtError::InvalidBaseVersion {
                base_version,
                current_version: document.version,
            });
        }

        let committed = self.store.operations_since(document_id, base_version).await?;
        if committed.len() as u64 != document.version - base_version {
            return Err(OtError::Persistence(format!(
                "log for {} has {} entries after version {}, document is at {}",
                document_id,
                committed.len(),
                base_version,
                document.version
            )));
        }

        let incoming = if committed.is_empty() {
            merge::normalize(&operation, &document.content)
        } else {
            let base_content = store::replay(self.store.as_ref(), document_id, base_version).await?;
            merge::normalize(&operation, &base_content)
        };
        let transformed =
            merge::transform_all(&incoming, committed.iter().map(|record| &record.operation));
        let new_version = base_version.max(document.version) + 1;
        let final_op = merge::normalize(&transformed, &document.content);
        let content = merge::apply(&document.content, &final_op);

        if let (Operation::Insert { text, .. }, Operation::Insert { text: applied, .. }) =
            (&operation, &final_op)
        {
            if !text.is_empty() && applied.is_empty() {
                tracing::debug!(
                    dropped_chars = text.chars().count(),
                    "insert landed inside a concurrently deleted range; its text was dropped"
                );
            }
        }

        self.store
            .commit(Commit {
                document_id: document_id.to_string(),
                expected_version: document.version,
                record: OperationRecord::new(document_id, new_version, base_version, final_op.clone()),
                content: content.clone(),
            })
            .await
            .map_err(|err| match err {
                OtError::Persistence(_) | OtError::DocumentNotFound(_) => err,
                other => OtError::Persistence(other.to_string()),
            })?;

        tracing::debug!(
            version = new_version,
            rebased_over = committed.len(),
            "accepted operation"
        );

        if self.config.is_snapshot_version(new_version) {
            self.write_snapshot(document_id, new_version, content).await;
        }

        Ok(Accepted {
            operation: final_op,
            version: new_version,
        })
    }

    async fn write_snapshot(&self, document_id: &str, version: u64, content: String) {
        match self
            .store
            .save_snapshot(Snapshot::new(document_id, version, content))
            .await
        {
            Ok(()) => tracing::debug!(document_id, version, "wrote snapshot"),
            Err(e) => tracing::warn!(document_id, version, "snapshot failed: {}", e),
        }
    }

    // ========== Recovery ==========

    /// Content of the document as it was at `version`.
    pub async fn content_at(&self, document_id: &str, version: u64) -> Result<VersionedContent> {
        let document = self.require_document(document_id).await?;
        if version > document.version {
            return Err(OtError::UnknownVersion {
                version,
                current_version: document.version,
            });
        }

        let content = store::replay(self.store.as_ref(), document_id, version).await?;
        Ok(VersionedContent { version, content })
    }

    /// Recompute the head content from snapshots and the log and compare it with the
    /// cached document row.
    pub async fn rebuild_document(&self, document_id: &str) -> Result<RebuildReport> {
        let _guard = self.lock_document(document_id).await;

        let document = self.require_document(document_id).await?;
        let content = store::replay(self.store.as_ref(), document_id, document.version).await?;
        let matches_cache = content == document.content;

        if !matches_cache {
            tracing::warn!(
                document_id,
                version = document.version,
                "document row disagrees with its operation log"
            );
        }

        Ok(RebuildReport {
            version: document.version,
            content,
            matches_cache,
        })
    }
}
