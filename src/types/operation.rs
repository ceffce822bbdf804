//! The operation model: a single edit intent against plain text.

use serde::{Deserialize, Serialize};

/// A single edit against a plain-text document.
///
/// Positions and lengths count Unicode scalar values (`char`s), not bytes, so an
/// operation can never split a UTF-8 sequence.
///
/// On the wire an operation is a tagged JSON object; every field of a variant is mandatory:
///
/// ```
/// use ot_axum_http::Operation;
///
/// let op: Operation = serde_json::from_str(r#"{"type":"insert","position":5,"text":"!"}"#).unwrap();
/// assert_eq!(op, Operation::insert(5, "!"));
///
/// let op: Operation = serde_json::from_str(r#"{"type":"delete","position":0,"length":2}"#).unwrap();
/// assert_eq!(op, Operation::delete(0, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    /// Insert `text` immediately before the character at `position`.
    Insert {
        /// Character offset of the insertion point
        position: usize,
        /// Text to insert
        text: String,
    },
    /// Remove `length` characters starting at `position`.
    Delete {
        /// Character offset of the first removed character
        position: usize,
        /// Number of characters to remove
        length: usize,
    },
}

impl Operation {
    /// Create an insert operation.
    pub fn insert(position: usize, text: impl Into<String>) -> Self {
        Operation::Insert {
            position,
            text: text.into(),
        }
    }

    /// Create a delete operation.
    pub fn delete(position: usize, length: usize) -> Self {
        Operation::Delete { position, length }
    }

    /// The operation's position.
    #[inline]
    pub fn position(&self) -> usize {
        match self {
            Operation::Insert { position, .. } | Operation::Delete { position, .. } => *position,
        }
    }

    /// Number of characters this operation adds (insert) or removes (delete).
    pub fn char_len(&self) -> usize {
        match self {
            Operation::Insert { text, .. } => text.chars().count(),
            Operation::Delete { length, .. } => *length,
        }
    }

    /// Whether applying this operation can never change any content.
    pub fn is_noop(&self) -> bool {
        match self {
            Operation::Insert { text, .. } => text.is_empty(),
            Operation::Delete { length, .. } => *length == 0,
        }
    }

    /// Short kind label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Insert { .. } => "insert",
            Operation::Delete { .. } => "delete",
        }
    }
}
