//! The content applier: a pure, total function from `(content, operation)` to new content.
//!
//! Applying never fails. Positions are clamped into the content, a delete that would run
//! past the end is truncated, and empty inserts or zero-length deletes return the content
//! unchanged. An operation that was already accepted into the log can therefore never
//! block the pipeline at this step.

use crate::types::Operation;

/// Byte offset of the `char_pos`-th character, or `content.len()` past the end.
fn byte_offset(content: &str, char_pos: usize) -> usize {
    content
        .char_indices()
        .nth(char_pos)
        .map(|(offset, _)| offset)
        .unwrap_or(content.len())
}

/// Clamp `op` to the effect it will actually have on `content`.
///
/// The result is the operation that should be logged and broadcast: applying it to
/// `content` gives exactly the same text as applying `op`, and every field is in range.
///
/// ```
/// use ot_axum_http::{merge::normalize, Operation};
///
/// assert_eq!(normalize(&Operation::delete(2, 10), "hi"), Operation::delete(2, 0));
/// assert_eq!(normalize(&Operation::insert(9, "!"), "hi"), Operation::insert(2, "!"));
/// ```
pub fn normalize(op: &Operation, content: &str) -> Operation {
    let len = content.chars().count();
    match op {
        Operation::Insert { position, text } => Operation::Insert {
            position: (*position).min(len),
            text: text.clone(),
        },
        Operation::Delete { position, length } => {
            let position = (*position).min(len);
            Operation::Delete {
                position,
                length: (*length).min(len - position),
            }
        }
    }
}

/// Apply `op` to `content`, producing the new content.
///
/// ```
/// use ot_axum_http::{merge::apply, Operation};
///
/// assert_eq!(apply("hello", &Operation::insert(5, " world")), "hello world");
/// assert_eq!(apply("hello", &Operation::delete(1, 3)), "ho");
/// assert_eq!(apply("hi", &Operation::delete(2, 10)), "hi");
/// ```
pub fn apply(content: &str, op: &Operation) -> String {
    if op.is_noop() {
        return content.to_string();
    }

    match normalize(op, content) {
        Operation::Insert { position, text } => {
            let at = byte_offset(content, position);
            let mut out = String::with_capacity(content.len() + text.len());
            out.push_str(&content[..at]);
            out.push_str(&text);
            out.push_str(&content[at..]);
            out
        }
        Operation::Delete { position, length } => {
            let start = byte_offset(content, position);
            let end = start + byte_offset(&content[start..], length);
            let mut out = String::with_capacity(content.len() - (end - start));
            out.push_str(&content[..start]);
            out.push_str(&content[end..]);
            out
        }
    }
}

/// Apply a sequence of operations in order.
pub fn apply_all<'a, I>(content: &str, ops: I) -> String
where
    I: IntoIterator<Item = &'a Operation>,
{
    ops.into_iter()
        .fold(content.to_string(), |acc, op| apply(&acc, op))
}
