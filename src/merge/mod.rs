//! Operational-transform algorithms for plain text.
//!
//! Concurrent edits are reconciled by transforming each incoming operation against every
//! operation committed since the version it was composed against, then applying the result
//! to the canonical content.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`transform`] | Adjust one operation for one earlier-committed concurrent operation |
//! | [`transform_all`] | Left fold of [`transform`] over committed operations in version order |
//! | [`apply`] | Apply an operation to text (total, never fails) |
//! | [`normalize`] | Clamp an operation to the effect [`apply`] will have |
//!
//! # Examples
//!
//! ## Concurrent inserts converge
//!
//! ```
//! use ot_axum_http::merge::{apply, transform};
//! use ot_axum_http::Operation;
//!
//! let base = "hello";
//! let a = Operation::insert(5, " world");
//! let b = Operation::insert(0, ">> ");
//!
//! let a_first = apply(&apply(base, &a), &transform(&b, &a));
//! let b_first = apply(&apply(base, &b), &transform(&a, &b));
//!
//! assert_eq!(a_first, ">> hello world");
//! assert_eq!(a_first, b_first);
//! ```
//!
//! ## Catching up over several versions
//!
//! ```
//! use ot_axum_http::merge::{apply, transform_all};
//! use ot_axum_http::Operation;
//!
//! // Both committed operations were accepted after our base version.
//! let committed = vec![Operation::insert(0, "[draft] "), Operation::delete(8, 2)];
//! let ours = Operation::insert(5, "!");
//!
//! let rebased = transform_all(&ours, &committed);
//! assert_eq!(rebased, Operation::insert(11, "!"));
//! ```

mod apply;
mod transform;

pub use apply::{apply, apply_all, normalize};
pub use transform::{transform, transform_all};
