//! Cache-first for cross-origin (CDN) assets.

use swcache_core::{InterceptedRequest, Response, ResponseKind};

use super::{Served, lookup, store_copy};
use crate::fetch::Network;
use crate::stores::StoreManager;

/// Serve from cache without revalidation; otherwise fetch and keep a copy.
///
/// Falls back to `503 Offline` when the network is unreachable.
pub async fn cache_first(request: &InterceptedRequest, stores: &StoreManager, network: &dyn Network) -> Served {
    if let Some(hit) = lookup(stores, request).await {
        return Served::cache(hit);
    }

    match network.fetch(request).await {
        Ok(response) => {
            let response = response.with_kind(ResponseKind::Cors);
            store_copy(stores, request, &response).await;
            Served::network(response)
        }
        Err(e) => {
            tracing::debug!(url = %request.url, "cross-origin fetch failed: {}", e);
            Served::fallback(Response::offline_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ResponseSource;
    use crate::testing::{RUNTIME, ScriptedNetwork, get, memory_stores};

    const AOS: &str = "https://unpkg.com/aos@2.3.1/dist/aos.js";

    #[tokio::test]
    async fn test_cached_entry_served_without_network() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new().respond(AOS, Response::new(200, "fresh"));
        stores.put(RUNTIME, &get(AOS), &Response::new(200, "cached")).await.unwrap();

        let served = cache_first(&get(AOS), &stores, &network).await;

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.text(), "cached");
        assert!(network.calls().is_empty());
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new().respond(AOS, Response::new(200, "aos"));

        let served = cache_first(&get(AOS), &stores, &network).await;
        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.kind, ResponseKind::Cors);

        let stored = stores.get(RUNTIME, &get(AOS)).await.unwrap().unwrap();
        assert_eq!(stored.text(), "aos");
    }

    #[tokio::test]
    async fn test_offline_miss_yields_503() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new();
        network.set_offline(true);

        let served = cache_first(&get(AOS), &stores, &network).await;
        assert_eq!(served.source, ResponseSource::Fallback);
        assert_eq!(served.response.status, 503);
        assert_eq!(served.response.text(), "Offline");
    }
}
