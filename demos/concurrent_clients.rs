//! Concurrent clients example
//!
//! Starts the server in-process, then has several clients edit the same document at
//! once, each composing against the version it last saw. Every client's edit is
//! rebased by the server and all of them land in one gap-free log.
//!
//! Run with: cargo run --example concurrent_clients

use anyhow::Context;
use futures::future::join_all;
use ot_axum_http::{router, DocumentCoordinator, OtClient, OtLayer, Operation};
use tracing_subscriber::EnvFilter;

const DOCUMENT: &str = "shopping";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ot_axum_http=info")),
        )
        .init();

    let coordinator = DocumentCoordinator::in_memory();
    coordinator
        .create_document(DOCUMENT, "Shopping list", "milk\n")
        .await?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let app = router(&OtLayer::with_coordinator(coordinator.clone()));
    tokio::spawn(async move { axum::serve(listener, app).await });

    // Each client appends at the end of whatever version it loaded; loads and submits interleave.
    let items = ["eggs\n", "bread\n", "apples\n", "coffee\n"];
    let edits = items.iter().enumerate().map(|(i, item)| {
        let client = OtClient::new(base_url.clone()).with_peer(format!("client-{i}"));
        async move {
            let seen = client.get_document(DOCUMENT).await?;
            let end = seen.content.chars().count();
            let accepted = client
                .submit(DOCUMENT, Operation::insert(end, *item), seen.version)
                .await?;
            println!(
                "client-{} inserted {:?} at {} -> accepted at {} as version {}",
                i,
                item.trim_end(),
                end,
                accepted.operation.position(),
                accepted.version
            );
            Ok::<_, ot_axum_http::OtError>(())
        }
    });

    for result in join_all(edits).await {
        result.context("client edit failed")?;
    }

    let client = OtClient::new(base_url);
    let document = client.get_document(DOCUMENT).await?;
    println!("\nversion {}:\n{}", document.version, document.content);

    for record in client.history(DOCUMENT, 0).await? {
        println!(
            "  v{} (base {}): {:?}",
            record.version, record.base_version, record.operation
        );
    }

    let report = coordinator.rebuild_document(DOCUMENT).await?;
    println!("\nlog replay matches document: {}", report.matches_cache);

    Ok(())
}
