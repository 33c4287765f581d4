//! Cache-or-fetch for same-origin static assets.

use swcache_core::{InterceptedRequest, Response};

use super::{Served, lookup, store_copy};
use crate::fetch::Network;
use crate::stores::StoreManager;

/// Serve from cache; otherwise fetch, keep a copy only when cacheable, and
/// return whatever the network gave back.
///
/// There is no offline substitute: a failed fetch becomes a network-error
/// response.
pub async fn cache_or_fetch(request: &InterceptedRequest, stores: &StoreManager, network: &dyn Network) -> Served {
    if let Some(hit) = lookup(stores, request).await {
        return Served::cache(hit);
    }

    match network.fetch(request).await {
        Ok(response) => {
            if response.is_cacheable() {
                store_copy(stores, request, &response).await;
            }
            Served::network(response)
        }
        Err(e) => {
            tracing::debug!(url = %request.url, "static asset fetch failed: {}", e);
            Served::network(Response::network_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ResponseSource;
    use crate::testing::{RUNTIME, ScriptedNetwork, get, memory_stores};

    const ABOUT: &str = "https://iwex.example/about.html";

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new().respond(ABOUT, Response::new(200, "<h1>About</h1>"));

        let first = cache_or_fetch(&get(ABOUT), &stores, &network).await;
        assert_eq!(first.source, ResponseSource::Network);

        let second = cache_or_fetch(&get(ABOUT), &stores, &network).await;
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(second.response.text(), "<h1>About</h1>");
        assert_eq!(network.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_uncacheable_response_returned_not_stored() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new().respond(ABOUT, Response::new(404, "missing"));

        let served = cache_or_fetch(&get(ABOUT), &stores, &network).await;
        assert_eq!(served.response.status, 404);
        assert!(stores.get(RUNTIME, &get(ABOUT)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_network_failure_propagates_as_network_error() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new();
        network.set_offline(true);

        let served = cache_or_fetch(&get(ABOUT), &stores, &network).await;
        assert!(served.response.is_network_error());
        assert_eq!(served.response.status, 0);
    }
}
