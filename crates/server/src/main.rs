//! swcache server entry point.
//!
//! Boots the offline worker and exposes its events as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchClient, FetchConfig, ServiceWorker};
use swcache_core::{AppConfig, CacheDb};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod host;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db = %config.db_path.display(), origin = %config.origin, "Starting swcache on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let host = Arc::new(host::StdioHost::new());
    let worker = ServiceWorker::new(&config, db, network, host.clone(), host.clone()).await?;

    let cancel = CancellationToken::new();
    let refresher = config
        .periodic_refresh()
        .map(|every| tokio::spawn(refresh_loop(worker.clone(), every, cancel.clone())));

    let server = serve_server(handler::SwCacheServer::new(worker.clone(), host), stdio()).await?;
    server.waiting().await?;

    cancel.cancel();
    if let Some(task) = refresher {
        task.await?;
    }
    worker.shutdown().await;

    Ok(())
}

/// Fire the periodic content refresh until cancelled.
async fn refresh_loop(worker: ServiceWorker, every: std::time::Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let outcome = worker.handle_periodic_sync(swcache_client::worker::UPDATE_CONTENT_TAG).await;
                tracing::debug!(?outcome, "periodic refresh");
            }
        }
    }
}
