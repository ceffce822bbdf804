//! Crate-level tests: end-to-end scenarios and property-based convergence checks.

use crate::merge::{apply, apply_all, transform, transform_all};
use crate::server::{DocumentCoordinator, ServerConfig};
use crate::store::{DocumentStore, MemoryStore};
use crate::Operation;
use proptest::prelude::*;
use std::sync::Arc;

// ========== Strategies ==========

/// Content mixing ASCII with multi-byte characters so char/byte confusion shows up.
fn content_strategy() -> impl Strategy<Value = String> {
    "[abé字]{0,10}"
}

/// An operation whose fields are in range for content of `len` characters.
fn valid_op(len: usize) -> impl Strategy<Value = Operation> {
    prop_oneof![
        (0..=len, "[xyü]{0,3}").prop_map(|(position, text)| Operation::insert(position, text)),
        (0..=len)
            .prop_flat_map(move |position| (Just(position), 0..=len - position))
            .prop_map(|(position, length)| Operation::delete(position, length)),
    ]
}

/// A position or length, mostly small but occasionally at the top of `usize`.
fn field() -> impl Strategy<Value = usize> {
    prop_oneof![
        8 => 0..16usize,
        1 => (usize::MAX - 2)..=usize::MAX,
    ]
}

/// An operation that may point past the end of the content.
fn any_op() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (field(), "[xyü]{0,3}").prop_map(|(position, text)| Operation::insert(position, text)),
        (field(), field()).prop_map(|(position, length)| Operation::delete(position, length)),
    ]
}

fn concurrent_pair() -> impl Strategy<Value = (String, Operation, Operation)> {
    content_strategy().prop_flat_map(|content| {
        let len = content.chars().count();
        (Just(content), valid_op(len), valid_op(len))
    })
}

fn coordinator_with(config: ServerConfig) -> (DocumentCoordinator, MemoryStore) {
    let store = MemoryStore::new();
    let coordinator = DocumentCoordinator::with_config(Arc::new(store.clone()), config);
    (coordinator, store)
}

// ========== Properties ==========

proptest! {
    #[test]
    fn test_transform_converges((content, a, b) in concurrent_pair()) {
        let a_first = apply(&apply(&content, &a), &transform(&b, &a));
        let b_first = apply(&apply(&content, &b), &transform(&a, &b));
        prop_assert_eq!(a_first, b_first);
    }

    #[test]
    fn test_transform_against_nothing_is_identity(op in any_op()) {
        prop_assert_eq!(transform_all(&op, std::iter::empty()), op);
    }

    #[test]
    fn test_apply_never_panics(content in content_strategy(), op in any_op()) {
        let out = apply(&content, &op);
        let before = content.chars().count();
        let after = out.chars().count();
        match &op {
            Operation::Insert { text, .. } => prop_assert_eq!(after, before + text.chars().count()),
            Operation::Delete { .. } => prop_assert!(after <= before),
        }
    }

    #[test]
    fn test_coordinator_order_independent((content, a, b) in concurrent_pair()) {
        let run = |first: Operation, second: Operation| {
            let content = content.clone();
            tokio_test::block_on(async move {
                let coordinator = DocumentCoordinator::in_memory();
                coordinator.create_document("doc", "Doc", &content).await.unwrap();
                coordinator.submit_operation("doc", first, 0).await.unwrap();
                coordinator.submit_operation("doc", second, 0).await.unwrap();
                coordinator.document("doc").await.unwrap()
            })
        };

        let ab = run(a.clone(), b.clone());
        let ba = run(b, a);
        prop_assert_eq!(ab.version, 2);
        prop_assert_eq!(ba.version, 2);
        prop_assert_eq!(ab.content, ba.content);
    }

    #[test]
    fn test_log_replays_to_document(
        submissions in prop::collection::vec((any_op(), 0..=100u64), 1..25),
    ) {
        tokio_test::block_on(async {
            let (coordinator, store) = coordinator_with(ServerConfig {
                snapshot_interval: 4,
                ..Default::default()
            });
            coordinator.create_document("doc", "Doc", "").await.unwrap();

            let mut contents = vec![String::new()];
            for (op, base_pct) in submissions {
                let version = coordinator.document("doc").await.unwrap().version;
                let base = version * base_pct / 100;
                let accepted = coordinator.submit_operation("doc", op, base).await.unwrap();
                assert_eq!(accepted.version, version + 1);
                contents.push(coordinator.document("doc").await.unwrap().content);
            }

            let document = coordinator.document("doc").await.unwrap();
            assert_eq!(document.version as usize, contents.len() - 1);
            assert_eq!(store.log_len("doc"), contents.len() - 1);

            // Replaying the whole log from empty content, ignoring snapshots.
            let log = store.operations_since("doc", 0).await.unwrap();
            let versions: Vec<u64> = log.iter().map(|record| record.version).collect();
            let expected: Vec<u64> = (1..=document.version).collect();
            assert_eq!(versions, expected);
            assert_eq!(
                apply_all("", log.iter().map(|record| &record.operation)),
                document.content
            );

            for (version, content) in contents.iter().enumerate() {
                let at = coordinator.content_at("doc", version as u64).await.unwrap();
                assert_eq!(&at.content, content);
            }

            let report = coordinator.rebuild_document("doc").await.unwrap();
            assert!(report.matches_cache);
        });
    }
}

// ========== Scenarios ==========

#[tokio::test]
async fn test_concurrent_inserts_at_both_ends() {
    for flip in [false, true] {
        let coordinator = DocumentCoordinator::in_memory();
        coordinator.create_document("doc", "Doc", "hello").await.unwrap();

        let mut ops = vec![Operation::insert(5, " world"), Operation::insert(0, ">> ")];
        if flip {
            ops.reverse();
        }
        for op in ops {
            coordinator.submit_operation("doc", op, 0).await.unwrap();
        }

        let document = coordinator.document("doc").await.unwrap();
        assert_eq!(document.content, ">> hello world");
        assert_eq!(document.version, 2);
    }
}

#[tokio::test]
async fn test_overrunning_delete_is_clamped() {
    let coordinator = DocumentCoordinator::in_memory();
    coordinator.create_document("doc", "Doc", "hi").await.unwrap();

    let accepted = coordinator
        .submit_operation("doc", Operation::delete(2, 10), 0)
        .await
        .unwrap();

    assert_eq!(accepted.operation, Operation::delete(2, 0));
    assert_eq!(accepted.version, 1);
    assert_eq!(coordinator.document("doc").await.unwrap().content, "hi");
}

#[tokio::test]
async fn test_submission_at_head_is_unchanged() {
    let coordinator = DocumentCoordinator::in_memory();
    coordinator.create_document("doc", "Doc", "abc").await.unwrap();
    coordinator
        .submit_operation("doc", Operation::insert(3, "d"), 0)
        .await
        .unwrap();

    let op = Operation::delete(1, 2);
    let accepted = coordinator
        .submit_operation("doc", op.clone(), 1)
        .await
        .unwrap();

    assert_eq!(accepted.operation, op);
    assert_eq!(accepted.version, 2);
    assert_eq!(coordinator.document("doc").await.unwrap().content, "ad");
}

#[tokio::test]
async fn test_three_clients_from_same_base() {
    let coordinator = DocumentCoordinator::in_memory();
    coordinator
        .create_document("doc", "Doc", "the cat sat")
        .await
        .unwrap();

    // "the " -> "a ", "cat" -> "dog", append "!"
    coordinator
        .submit_operation("doc", Operation::delete(0, 4), 0)
        .await
        .unwrap();
    coordinator
        .submit_operation("doc", Operation::insert(0, "a "), 0)
        .await
        .unwrap();
    coordinator
        .submit_operation("doc", Operation::delete(4, 3), 0)
        .await
        .unwrap();
    coordinator
        .submit_operation("doc", Operation::insert(4, "dog"), 0)
        .await
        .unwrap();
    coordinator
        .submit_operation("doc", Operation::insert(11, "!"), 0)
        .await
        .unwrap();

    let document = coordinator.document("doc").await.unwrap();
    assert_eq!(document.content, "a dog sat!");
    assert_eq!(document.version, 5);
}
