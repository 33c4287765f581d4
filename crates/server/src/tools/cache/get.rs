//! cache_get tool implementation.
//!
//! Looks up a stored response, or lists a store's entries when no URL is
//! given.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::ServiceWorker;
use swcache_client::fetch::resolve;
use swcache_core::{EntrySummary, Error, InterceptedRequest, ResponseKind};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Request URL, absolute or relative to the origin.
    #[serde(default)]
    pub url: Option<String>,

    /// Restrict the lookup to one store. Required when `url` is absent.
    #[serde(default)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachedResponse {
    pub url: String,
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreListing {
    pub store: String,
    pub entries: Vec<EntrySummary>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &ServiceWorker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let stores = worker.stores();

    let Some(raw) = params.url else {
        let store = params
            .store
            .ok_or_else(|| Error::InvalidInput("either url or store must be specified".into()))?;
        let entries = stores.db().list_entries(&store).await?;
        return json_result(&StoreListing { store, entries });
    };

    let url = resolve(worker.origin(), &raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
    let request = InterceptedRequest::get(url);
    let hit = match &params.store {
        Some(store) => stores.get(store, &request).await?,
        None => stores.match_any(&request).await?,
    };
    let response = hit.ok_or_else(|| Error::CacheMiss(request.url.to_string()))?;

    json_result(&CachedResponse {
        url: request.url.to_string(),
        status: response.status,
        kind: response.kind,
        body: response.text(),
        headers: response.headers,
    })
}
