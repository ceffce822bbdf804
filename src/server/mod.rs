//! Server side: the document coordinator and its Axum HTTP binding.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DocumentCoordinator`] | Serializes submissions per document and runs reconcile/apply/commit |
//! | [`ServerConfig`] | Snapshot interval, bind address, body limits |
//! | [`OtLayer`] | Middleware injecting the coordinator and parsed protocol headers |
//! | [`UpdateResponse`] | Versioned JSON response builder |
//! | [`router`] | Routes for submissions, document state, history and past versions |

mod config;
mod coordinator;
mod handlers;
mod middleware;
mod send_update;

pub use config::ServerConfig;
pub use coordinator::{DocumentCoordinator, RebuildReport};
pub use handlers::{router, HistoryQuery};
pub use middleware::{OtLayer, RequestHeaders};
pub use send_update::UpdateResponse;
