//! cache_purge tool implementation.
//!
//! Deletes a single entry, a whole store, or every store that is not current.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::ServiceWorker;
use swcache_client::fetch::resolve;
use swcache_core::{Error, RequestKey};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Store to purge from. With `url`, only that entry is removed.
    #[serde(default)]
    pub store: Option<String>,

    /// Entry URL to remove from `store`.
    #[serde(default)]
    pub url: Option<String>,

    /// Delete every store other than the current precache and runtime stores.
    #[serde(default)]
    pub stale: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    pub deleted_stores: Vec<String>,
    pub deleted_entries: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(worker: &ServiceWorker, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.store.is_none() && !params.stale {
        return Err(Error::InvalidInput("at least one of store or stale must be specified".into()).into());
    }
    if params.url.is_some() && params.store.is_none() {
        return Err(Error::InvalidInput("url requires store".into()).into());
    }

    let stores = worker.stores();
    let mut output = CachePurgeOutput::default();

    match (params.store, params.url) {
        (Some(store), Some(raw)) => {
            let url = resolve(worker.origin(), &raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
            if stores.db().delete_entry(&store, &RequestKey::get(&url)).await? {
                output.deleted_entries += 1;
            }
        }
        (Some(store), None) => {
            let entries = stores.db().entry_count(&store).await?;
            if stores.db().delete_store(&store).await? {
                tracing::info!(store = %store, entries, "purged store");
                output.deleted_entries += entries;
                output.deleted_stores.push(store);
            }
        }
        (None, _) => {}
    }

    if params.stale {
        output
            .deleted_stores
            .extend(stores.purge_stale_stores(&stores.current_names()).await?);
    }

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{parse, worker};
    use swcache_core::{InterceptedRequest, Response};

    fn params(store: Option<&str>, url: Option<&str>, stale: bool) -> CachePurgeParams {
        CachePurgeParams { store: store.map(Into::into), url: url.map(Into::into), stale }
    }

    async fn seed(worker: &ServiceWorker, store: &str, url: &str) {
        let request = InterceptedRequest::get(url.parse().unwrap());
        worker
            .stores()
            .put(store, &request, &Response::new(200, "x"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_purge_entry() {
        let (worker, _) = worker().await;
        seed(&worker, "iwex-runtime-v1", "https://iwex.example/a.css").await;
        seed(&worker, "iwex-runtime-v1", "https://iwex.example/b.css").await;

        let result = purge_impl(&worker, params(Some("iwex-runtime-v1"), Some("/a.css"), false))
            .await
            .unwrap();
        let output: CachePurgeOutput = parse(&result);
        assert_eq!(output.deleted_entries, 1);
        assert!(output.deleted_stores.is_empty());
        assert_eq!(worker.stores().db().entry_count("iwex-runtime-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_purge_store_and_stale() {
        let (worker, _) = worker().await;
        seed(&worker, "iwex-runtime-v1", "https://iwex.example/a.css").await;
        seed(&worker, "iwex-website-v0", "https://iwex.example/").await;

        let result = purge_impl(&worker, params(Some("iwex-runtime-v1"), None, true))
            .await
            .unwrap();
        let output: CachePurgeOutput = parse(&result);
        assert_eq!(output.deleted_stores, vec!["iwex-runtime-v1", "iwex-website-v0"]);
        assert_eq!(output.deleted_entries, 1);
        assert!(worker.stores().db().store_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_no_params() {
        let (worker, _) = worker().await;
        assert!(purge_impl(&worker, params(None, None, false)).await.is_err());
        assert!(purge_impl(&worker, params(None, Some("/a.css"), true)).await.is_err());
    }
}
