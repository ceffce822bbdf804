//! The transform engine.
//!
//! [`transform`] rewrites an incoming operation so that it has the intended effect on
//! content to which an earlier-committed, concurrent operation has already been applied.
//! Both operations must have been composed against the same base content.
//!
//! | incoming \ committed | insert | delete |
//! |----------------------|--------|--------|
//! | insert | shift right when the committed insert is to the left (ties: see Ordering) | shift left past the deleted range; inside the range: collapse to its start, text absorbed |
//! | delete | shift right when the committed insert is at or before it; grow when it lands inside | shift left past the deleted range; shrink by the overlap |
//!
//! # Ordering
//!
//! Two inserts at the same position are ordered by their text: the insert whose text
//! sorts first ends up on the left. The rule looks only at the two operations, so both
//! processing orders produce the same content. Identical texts produce identical content
//! either way.
//!
//! # Inserts inside a concurrently deleted range
//!
//! A single contiguous delete cannot remove both halves of a range while preserving text
//! inserted in its middle. The delete therefore wins: the transformed insert collapses to
//! the start of the deleted range with empty text, and a delete transformed against an
//! insert strictly inside its range grows to cover the inserted text.

use crate::types::Operation;

/// Transform `op` against `committed`, which was accepted earlier from the same base.
///
/// ```
/// use ot_axum_http::{merge::transform, Operation};
///
/// // Someone inserted ">> " at the start; our insert at the end moves right.
/// let ours = Operation::insert(5, " world");
/// let theirs = Operation::insert(0, ">> ");
/// assert_eq!(transform(&ours, &theirs), Operation::insert(8, " world"));
/// ```
pub fn transform(op: &Operation, committed: &Operation) -> Operation {
    match (op, committed) {
        (
            Operation::Insert { position, text },
            Operation::Insert {
                position: other,
                text: other_text,
            },
        ) => {
            let other_goes_first =
                *other < *position || (*other == *position && other_text.as_str() <= text.as_str());
            if other_goes_first {
                Operation::Insert {
                    position: position.saturating_add(other_text.chars().count()),
                    text: text.clone(),
                }
            } else {
                op.clone()
            }
        }

        (Operation::Insert { position, text }, Operation::Delete { position: start, length }) => {
            let end = start.saturating_add(*length);
            if *position <= *start {
                op.clone()
            } else if *position >= end {
                Operation::Insert {
                    position: position - length,
                    text: text.clone(),
                }
            } else {
                Operation::Insert {
                    position: *start,
                    text: String::new(),
                }
            }
        }

        (Operation::Delete { position, length }, Operation::Insert { position: at, text }) => {
            let inserted = text.chars().count();
            if *at <= *position {
                Operation::Delete {
                    position: position.saturating_add(inserted),
                    length: *length,
                }
            } else if *at < position.saturating_add(*length) {
                Operation::Delete {
                    position: *position,
                    length: length.saturating_add(inserted),
                }
            } else {
                op.clone()
            }
        }

        (
            Operation::Delete { position, length },
            Operation::Delete {
                position: other,
                length: other_length,
            },
        ) => {
            let end = position.saturating_add(*length);
            let other_end = other.saturating_add(*other_length);
            let overlap = end.min(other_end).saturating_sub(*position.max(other));

            let position = if *position <= *other {
                *position
            } else if *position >= other_end {
                position - other_length
            } else {
                *other
            };

            Operation::Delete {
                position,
                length: length - overlap,
            }
        }
    }
}

/// Transform `op` against every operation committed after its base version.
///
/// `committed` must be in ascending version order; each step's output is the input of the
/// next, so the order is significant. An empty list returns `op` unchanged.
pub fn transform_all<'a, I>(op: &Operation, committed: I) -> Operation
where
    I: IntoIterator<Item = &'a Operation>,
{
    committed
        .into_iter()
        .fold(op.clone(), |acc, other| transform(&acc, other))
}
