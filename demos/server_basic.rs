//! Basic OT HTTP server example
//!
//! Serves one seeded document over the coordinator's HTTP routes.
//!
//! Run with: cargo run --example server_basic
//!
//! Then, from another terminal:
//!
//! ```text
//! curl http://127.0.0.1:3000/documents/welcome
//! curl -X POST http://127.0.0.1:3000/documents/welcome/operations \
//!      -H 'Parents: "0"' \
//!      -d '{"operation": {"type": "insert", "position": 5, "text": ", world"}}'
//! curl 'http://127.0.0.1:3000/documents/welcome/operations?after=0'
//! curl http://127.0.0.1:3000/documents/welcome/versions/0
//! ```

use anyhow::Context;
use ot_axum_http::{router, DocumentCoordinator, MemoryStore, OtLayer, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ot_axum_http=debug,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let coordinator = DocumentCoordinator::with_config(Arc::new(MemoryStore::new()), config);
    coordinator
        .create_document("welcome", "Welcome", "hello")
        .await
        .context("seeding the welcome document")?;

    let app = router(&OtLayer::with_coordinator(coordinator));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
