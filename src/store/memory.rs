//! In-memory [`DocumentStore`].
//!
//! All three tables live behind a single `RwLock`, which makes a commit (log append plus
//! document update) trivially atomic: readers observe either the state before the commit
//! or the state after it.

use super::{Commit, DocumentStore};
use crate::error::{OtError, Result};
use crate::types::{Document, OperationRecord, Snapshot};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Tables {
    documents: HashMap<String, Document>,
    /// Document id -> log, index `i` holds version `i + 1`
    operations: HashMap<String, Vec<OperationRecord>>,
    /// Document id -> snapshots in insertion order
    snapshots: HashMap<String, Vec<Snapshot>>,
}

/// Thread-safe in-memory store.
///
/// Cloning creates a new handle to the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of log entries for a document.
    pub fn log_len(&self, document_id: &str) -> usize {
        self.tables
            .read()
            .operations
            .get(document_id)
            .map_or(0, Vec::len)
    }

    /// All snapshots recorded for a document, oldest first.
    pub fn snapshots(&self, document_id: &str) -> Vec<Snapshot> {
        self.tables
            .read()
            .snapshots
            .get(document_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, document: Document) -> Result<Document> {
        let mut tables = self.tables.write();
        if tables.documents.contains_key(&document.id) {
            return Err(OtError::DocumentExists(document.id));
        }
        if !document.content.is_empty() {
            tables.snapshots.insert(
                document.id.clone(),
                vec![Snapshot::new(&document.id, 0, document.content.clone())],
            );
        }
        tables.operations.insert(document.id.clone(), Vec::new());
        tables
            .documents
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn load_document(&self, document_id: &str) -> Result<Option<Document>> {
        Ok(self.tables.read().documents.get(document_id).cloned())
    }

    async fn operations_since(
        &self,
        document_id: &str,
        after_version: u64,
    ) -> Result<Vec<OperationRecord>> {
        let tables = self.tables.read();
        let log = match tables.operations.get(document_id) {
            Some(log) => log,
            None => return Ok(Vec::new()),
        };
        let skip = usize::try_from(after_version).unwrap_or(usize::MAX);
        Ok(log.iter().skip(skip).cloned().collect())
    }

    async fn commit(&self, commit: Commit) -> Result<Document> {
        let mut tables = self.tables.write();
        let Tables {
            documents,
            operations,
            ..
        } = &mut *tables;

        let document = documents
            .get_mut(&commit.document_id)
            .ok_or_else(|| OtError::DocumentNotFound(commit.document_id.clone()))?;

        if document.version != commit.expected_version {
            return Err(OtError::Persistence(format!(
                "document {} is at version {}, commit expected {}",
                commit.document_id, document.version, commit.expected_version
            )));
        }
        if commit.record.version != commit.expected_version + 1 {
            return Err(OtError::Persistence(format!(
                "log entry version {} does not follow {}",
                commit.record.version, commit.expected_version
            )));
        }

        let log = operations.entry(commit.document_id.clone()).or_default();
        if log.len() as u64 != commit.expected_version {
            return Err(OtError::Persistence(format!(
                "log for {} has {} entries, document row says {}",
                commit.document_id,
                log.len(),
                commit.expected_version
            )));
        }

        document.content = commit.content;
        document.version = commit.record.version;
        document.updated_at = commit.record.created_at;
        log.push(commit.record);

        Ok(document.clone())
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.documents.contains_key(&snapshot.document_id) {
            return Err(OtError::Snapshot(format!(
                "no document {} for snapshot at version {}",
                snapshot.document_id, snapshot.version
            )));
        }
        tables
            .snapshots
            .entry(snapshot.document_id.clone())
            .or_default()
            .push(snapshot);
        Ok(())
    }

    async fn latest_snapshot(&self, document_id: &str, version: u64) -> Result<Option<Snapshot>> {
        let tables = self.tables.read();
        Ok(tables.snapshots.get(document_id).and_then(|snapshots| {
            snapshots
                .iter()
                .filter(|snapshot| snapshot.version <= version)
                .max_by_key(|snapshot| snapshot.version)
                .cloned()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Operation;

    fn commit_for(version: u64, content: &str) -> Commit {
        Commit {
            document_id: "doc".into(),
            expected_version: version - 1,
            record: OperationRecord::new("doc", version, version - 1, Operation::insert(0, "x")),
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let store = MemoryStore::new();
        store
            .create_document(Document::new("doc", "Title", ""))
            .await
            .unwrap();

        let doc = store.load_document("doc").await.unwrap().unwrap();
        assert_eq!(doc.version, 0);
        assert!(store.load_document("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_records_seed_snapshot() {
        let store = MemoryStore::new();
        store
            .create_document(Document::new("seeded", "", "hello"))
            .await
            .unwrap();
        store
            .create_document(Document::new("blank", "", ""))
            .await
            .unwrap();

        let seed = store.latest_snapshot("seeded", 0).await.unwrap().unwrap();
        assert_eq!(seed.version, 0);
        assert_eq!(seed.content, "hello");
        assert!(store.snapshots("blank").is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let store = MemoryStore::new();
        store
            .create_document(Document::new("doc", "a", ""))
            .await
            .unwrap();
        let err = store
            .create_document(Document::new("doc", "b", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, OtError::DocumentExists(_)));
    }

    #[tokio::test]
    async fn test_commit_advances_version_and_log() {
        let store = MemoryStore::new();
        store
            .create_document(Document::new("doc", "", ""))
            .await
            .unwrap();

        let doc = store.commit(commit_for(1, "x")).await.unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.content, "x");
        assert_eq!(store.log_len("doc"), 1);

        let records = store.operations_since("doc", 0).await.unwrap();
        assert_eq!(records[0].version, 1);
        assert!(store.operations_since("doc", 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_commit_is_rejected_without_changes() {
        let store = MemoryStore::new();
        store
            .create_document(Document::new("doc", "", ""))
            .await
            .unwrap();
        store.commit(commit_for(1, "x")).await.unwrap();

        let err = store.commit(commit_for(1, "yy")).await.unwrap_err();
        assert!(matches!(err, OtError::Persistence(_)));

        let doc = store.load_document("doc").await.unwrap().unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.content, "x");
        assert_eq!(store.log_len("doc"), 1);
    }

    #[tokio::test]
    async fn test_commit_missing_document() {
        let store = MemoryStore::new();
        let err = store.commit(commit_for(1, "x")).await.unwrap_err();
        assert!(matches!(err, OtError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_latest_snapshot_at_or_before() {
        let store = MemoryStore::new();
        store
            .create_document(Document::new("doc", "", ""))
            .await
            .unwrap();
        store.save_snapshot(Snapshot::new("doc", 10, "ten")).await.unwrap();
        store.save_snapshot(Snapshot::new("doc", 20, "twenty")).await.unwrap();

        assert!(store.latest_snapshot("doc", 9).await.unwrap().is_none());
        assert_eq!(
            store.latest_snapshot("doc", 15).await.unwrap().unwrap().content,
            "ten"
        );
        assert_eq!(
            store.latest_snapshot("doc", 20).await.unwrap().unwrap().version,
            20
        );
        assert_eq!(store.snapshots("doc").len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_for_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .save_snapshot(Snapshot::new("ghost", 10, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, OtError::Snapshot(_)));
    }
}
