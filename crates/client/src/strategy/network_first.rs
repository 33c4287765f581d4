//! Network-first for same-origin API calls.

use swcache_core::{InterceptedRequest, Response};

use super::{Served, lookup, store_copy};
use crate::fetch::Network;
use crate::stores::StoreManager;

/// Prefer fresh CMS content; fall back to the last cached copy, then to the
/// structured offline JSON reply.
pub async fn network_first(request: &InterceptedRequest, stores: &StoreManager, network: &dyn Network) -> Served {
    match network.fetch(request).await {
        Ok(response) => {
            if request.is_get() && response.is_cacheable() {
                store_copy(stores, request, &response).await;
            }
            Served::network(response)
        }
        Err(e) => {
            tracing::debug!(url = %request.url, "api fetch failed, trying cache: {}", e);
            match lookup(stores, request).await {
                Some(hit) => Served::cache(hit),
                None => Served::fallback(Response::offline_json()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ResponseSource;
    use crate::testing::{RUNTIME, ScriptedNetwork, get, memory_stores};

    const FAQS: &str = "https://iwex.example/api/method/get_faqs";

    #[tokio::test]
    async fn test_offline_without_cache_returns_offline_json() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new();
        network.set_offline(true);

        let served = network_first(&get(FAQS), &stores, &network).await;

        assert_eq!(served.source, ResponseSource::Fallback);
        let body: serde_json::Value = serde_json::from_slice(&served.response.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "You are offline. Please check your connection."})
        );
        assert_eq!(served.response.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_success_refreshes_cache() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new().respond(FAQS, Response::new(200, r#"{"message":[]}"#));
        stores.put(RUNTIME, &get(FAQS), &Response::new(200, "stale")).await.unwrap();

        let served = network_first(&get(FAQS), &stores, &network).await;
        assert_eq!(served.source, ResponseSource::Network);

        let stored = stores.get(RUNTIME, &get(FAQS)).await.unwrap().unwrap();
        assert_eq!(stored.text(), r#"{"message":[]}"#);
    }

    #[tokio::test]
    async fn test_network_failure_serves_cached_copy() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new();
        stores.put(RUNTIME, &get(FAQS), &Response::new(200, "cached faqs")).await.unwrap();
        network.set_offline(true);

        let served = network_first(&get(FAQS), &stores, &network).await;
        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.text(), "cached faqs");
    }

    #[tokio::test]
    async fn test_error_status_is_returned_but_not_cached() {
        let stores = memory_stores().await;
        let network = ScriptedNetwork::new().respond(FAQS, Response::new(500, "boom"));

        let served = network_first(&get(FAQS), &stores, &network).await;
        assert_eq!(served.response.status, 500);
        assert!(stores.get(RUNTIME, &get(FAQS)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_is_not_cached() {
        let stores = memory_stores().await;
        let url = "https://iwex.example/api/method/submit_contact";
        let network = ScriptedNetwork::new().respond(url, Response::new(200, r#"{"success":true}"#));

        let request = get(url).with_method("POST");
        let served = network_first(&request, &stores, &network).await;
        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(stores.db().entry_count(RUNTIME).await.unwrap(), 0);
    }
}
