#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # OT over HTTP: Collaborative Plain-Text Editing
//!
//! This crate implements a server-authoritative operational-transform (OT) engine for
//! plain-text documents. Clients edit locally and submit single-character-range operations
//! tagged with the version they composed against; the server rebases each submission over
//! everything accepted since, applies it, and appends it to a totally ordered log.
//!
//! ## Overview
//!
//! The engine is built from four layers:
//!
//! 1. **Operations** - [`Operation::Insert`] and [`Operation::Delete`] over char positions
//! 2. **Merge** - Pure [`transform`](merge::transform) and [`apply`](merge::apply) functions
//! 3. **Coordination** - [`DocumentCoordinator`] serializes submissions per document and commits
//!    the new content together with its log entry
//! 4. **Transport** - An Axum [`router`] and an [`OtClient`] speaking JSON over HTTP
//!
//! ## Guarantees
//!
//! - **Convergence**: two concurrent edits applied in either order produce the same text
//! - **Gap-free versions**: the log holds exactly one entry for every version `1..=n`
//! - **Atomic commits**: content and log entry are persisted together or not at all
//! - **Replayability**: content at any version is rebuilt from a snapshot and the log
//!
//! ## Transform Example
//!
//! ```
//! use ot_axum_http::merge::{apply, transform};
//! use ot_axum_http::Operation;
//!
//! let base = "hello";
//! let a = Operation::insert(0, "A");
//! let b = Operation::delete(1, 3);
//!
//! let left = apply(&apply(base, &a), &transform(&b, &a));
//! let right = apply(&apply(base, &b), &transform(&a, &b));
//! assert_eq!(left, "Aho");
//! assert_eq!(left, right);
//! ```
//!
//! ## Coordinator Example
//!
//! ```
//! use ot_axum_http::{DocumentCoordinator, Operation};
//!
//! # tokio_test::block_on(async {
//! let coordinator = DocumentCoordinator::in_memory();
//! coordinator.create_document("notes", "Notes", "hello").await?;
//!
//! // Two clients composed against version 0
//! coordinator.submit_operation("notes", Operation::insert(5, "!"), 0).await?;
//! let accepted = coordinator
//!     .submit_operation("notes", Operation::insert(0, ">"), 0)
//!     .await?;
//!
//! assert_eq!(accepted.version, 2);
//! assert_eq!(coordinator.document("notes").await?.content, ">hello!");
//! # Ok::<(), ot_axum_http::OtError>(())
//! # }).unwrap();
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Documents, operations, log records and snapshots
//! - **[error]** - Error types and result handling
//! - **[merge]** - Transform and apply
//! - **[store]** - Persistence trait and the in-memory store
//! - **[server]** - Coordinator and Axum integration
//! - **[client]** - HTTP client with retry
//! - **[protocol]** - Protocol header names and version header parsing

pub mod client;
pub mod error;
pub mod merge;
pub mod protocol;
pub mod server;
pub mod store;
pub mod types;

pub use client::{ClientConfig, OtClient};
pub use error::{OtError, Result};
pub use server::{router, DocumentCoordinator, OtLayer, ServerConfig};
pub use store::{DocumentStore, MemoryStore};
pub use types::{
    Accepted, Document, Operation, OperationRecord, Snapshot, Submission, VersionedContent,
};

#[cfg(test)]
mod tests;
