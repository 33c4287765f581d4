//! sw_fetch: dispatch a request through the worker.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::fetch::resolve;
use swcache_client::{ResponseSource, RoutingDecision, ServiceWorker};
use swcache_core::{Error, InterceptedRequest, ResponseKind};

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the worker's origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Whether this is a top-level page navigation.
    #[serde(default)]
    pub navigate: bool,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// Absent when the page was not controlled.
    pub decision: Option<RoutingDecision>,
    pub source: ResponseSource,
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    pub body_len: usize,
    pub url: Option<String>,
}

pub async fn fetch_impl(worker: &ServiceWorker, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.method.is_empty() || !params.method.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidInput(format!("invalid method: {:?}", params.method)).into());
    }

    let url = resolve(worker.origin(), &params.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;

    let base = if params.navigate { InterceptedRequest::navigation(url) } else { InterceptedRequest::get(url) };
    let request = params
        .headers
        .iter()
        .fold(base.with_method(&params.method), |req, (name, value)| req.with_header(name, value));

    tracing::debug!(url = %request.url, method = %request.method, navigate = request.navigate, "sw_fetch");

    let outcome = worker.handle_fetch(request).await?;
    let response = outcome.response;
    let output = SwFetchOutput {
        decision: outcome.decision,
        source: outcome.source,
        status: response.status,
        kind: response.kind,
        body: response.text(),
        body_len: response.body.len(),
        headers: response.headers,
        url: response.url,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{parse, worker};

    fn params(url: &str) -> SwFetchParams {
        SwFetchParams { url: url.into(), method: default_method(), navigate: false, headers: BTreeMap::new() }
    }

    #[tokio::test]
    async fn test_offline_api_call_falls_back() {
        let (worker, _) = worker().await;
        worker.install().await.unwrap();

        let result = fetch_impl(&worker, params("/api/method/get_faqs")).await.unwrap();
        let output: SwFetchOutput = parse(&result);

        assert_eq!(output.decision, Some(RoutingDecision::ApiCall));
        assert_eq!(output.source, ResponseSource::Fallback);
        assert_eq!(output.status, 200);
        assert!(output.body.contains("offline"));
    }

    #[tokio::test]
    async fn test_offline_navigation_gets_offline_page() {
        let (worker, _) = worker().await;
        worker.install().await.unwrap();

        let result = fetch_impl(&worker, SwFetchParams { navigate: true, ..params("/services") })
            .await
            .unwrap();
        let output: SwFetchOutput = parse(&result);

        assert_eq!(output.decision, Some(RoutingDecision::Navigation));
        assert_eq!(output.source, ResponseSource::Fallback);
        assert!(output.body.contains("<h1>Offline</h1>"));
    }

    #[tokio::test]
    async fn test_uncontrolled_fetch_surfaces_network_error() {
        let (worker, _) = worker().await;
        let err = fetch_impl(&worker, params("/")).await.unwrap_err();
        assert_eq!(err.code.0, -32005);
    }

    #[tokio::test]
    async fn test_rejects_bad_method_and_scheme() {
        let (worker, _) = worker().await;

        let err = fetch_impl(&worker, SwFetchParams { method: "GE T".into(), ..params("/") })
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32602);

        let err = fetch_impl(&worker, params("ftp://files.example/a")).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }
}
