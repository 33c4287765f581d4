//! Page navigations: cache first, populate on miss, offline page on failure.

use swcache_core::{InterceptedRequest, Response};

use super::{Served, lookup, store_copy};
use crate::fetch::Network;
use crate::stores::StoreManager;

pub async fn navigate(request: &InterceptedRequest, stores: &StoreManager, network: &dyn Network) -> Served {
    if let Some(hit) = lookup(stores, request).await {
        return Served::cache(hit);
    }

    match network.fetch(request).await {
        Ok(response) => {
            store_copy(stores, request, &response).await;
            Served::network(response)
        }
        Err(e) => {
            tracing::debug!(url = %request.url, "navigation fetch failed: {}", e);
            offline_page(request, stores).await
        }
    }
}

/// The cached root page if there is one, else the synthetic offline page.
async fn offline_page(request: &InterceptedRequest, stores: &StoreManager) -> Served {
    if let Ok(root) = request.url.join("/")
        && let Some(hit) = lookup(stores, &InterceptedRequest::get(root)).await
    {
        return Served::fallback(hit);
    }
    Served::fallback(Response::offline_html())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ResponseSource;
    use crate::testing::{PRECACHE, RUNTIME, ScriptedNetwork, get, memory_stores, nav};
    use swcache_core::http::OFFLINE_HTML;

    #[tokio::test]
    async fn test_offline_navigation_to_root_returns_cached_root() {
        let stores = memory_stores().await;
        let root = Response::new(200, "<html>iWEX</html>").with_header("Content-Type", "text/html");
        stores.put(PRECACHE, &get("https://iwex.example/"), &root).await.unwrap();
        let network = ScriptedNetwork::new();
        network.set_offline(true);

        let served = navigate(&nav("https://iwex.example/"), &stores, &network).await;
        assert_eq!(served.response, root);
        assert!(network.calls().is_empty());
    }

    #[tokio::test]
    async fn test_offline_unknown_page_falls_back_to_root() {
        let stores = memory_stores().await;
        stores
            .put(PRECACHE, &get("https://iwex.example/"), &Response::new(200, "home"))
            .await
            .unwrap();
        let network = ScriptedNetwork::new();
        network.set_offline(true);

        let served = navigate(&nav("https://iwex.example/services"), &stores, &network).await;
        assert_eq!(served.source, ResponseSource::Fallback);
        assert_eq!(served.response.text(), "home");
    }

    #[tokio::test]
    async fn test_offline_without_root_serves_synthetic_page() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new();
        network.set_offline(true);

        let served = navigate(&nav("https://iwex.example/services"), &stores, &network).await;
        assert_eq!(served.response.text(), OFFLINE_HTML);
        assert_eq!(served.response.header("content-type"), Some("text/html"));
    }

    #[tokio::test]
    async fn test_miss_fetches_and_populates_runtime() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new().respond("https://iwex.example/services", Response::new(200, "services"));

        let served = navigate(&nav("https://iwex.example/services"), &stores, &network).await;
        assert_eq!(served.source, ResponseSource::Network);

        let stored = stores.get(RUNTIME, &get("https://iwex.example/services")).await.unwrap();
        assert_eq!(stored.unwrap().text(), "services");
    }
}
