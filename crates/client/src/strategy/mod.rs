//! Strategy executors.
//!
//! Each strategy turns a request into a [`Response`] and never fails: network
//! failures fall back to cache, and cache misses fall through to the next
//! step or to a synthetic offline response.

mod cross_origin;
mod navigation;
mod network_first;
mod static_asset;

pub use cross_origin::cache_first;
pub use navigation::navigate;
pub use network_first::network_first;
pub use static_asset::cache_or_fetch;

use serde::{Deserialize, Serialize};
use swcache_core::{InterceptedRequest, Response};

use crate::fetch::Network;
use crate::router::RoutingDecision;
use crate::stores::StoreManager;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
    /// Synthetic or substitute response produced after a failure.
    Fallback,
}

/// A response together with its source.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    pub fn cache(response: Response) -> Self {
        Self { response, source: ResponseSource::Cache }
    }

    pub fn network(response: Response) -> Self {
        Self { response, source: ResponseSource::Network }
    }

    pub fn fallback(response: Response) -> Self {
        Self { response, source: ResponseSource::Fallback }
    }
}

/// Run the strategy matching `decision`.
pub async fn execute(
    decision: RoutingDecision, request: &InterceptedRequest, stores: &StoreManager, network: &dyn Network,
) -> Served {
    let served = match decision {
        RoutingDecision::CrossOriginAsset => cache_first(request, stores, network).await,
        RoutingDecision::ApiCall => network_first(request, stores, network).await,
        RoutingDecision::Navigation => navigate(request, stores, network).await,
        RoutingDecision::StaticAsset => cache_or_fetch(request, stores, network).await,
    };

    tracing::debug!(
        url = %request.url,
        decision = ?decision,
        source = ?served.source,
        status = served.response.status,
        "served request"
    );

    served
}

/// Cache lookup where a storage error counts as a miss.
async fn lookup(stores: &StoreManager, request: &InterceptedRequest) -> Option<Response> {
    match stores.match_any(request).await {
        Ok(hit) => hit,
        Err(e) => {
            tracing::warn!(url = %request.url, "cache lookup failed: {}", e);
            None
        }
    }
}

/// Best-effort copy into the runtime store.
async fn store_copy(stores: &StoreManager, request: &InterceptedRequest, response: &Response) {
    if let Err(e) = stores.put(stores.runtime(), request, response).await {
        tracing::warn!(url = %request.url, "runtime cache write skipped: {}", e);
    }
}
