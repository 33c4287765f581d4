//! sw_message: post a message from the page to the worker.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::ServiceWorker;

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// Message payload, e.g. `{"type": "SKIP_WAITING"}` or
    /// `{"type": "CACHE_URLS", "urls": ["/about.html"]}`.
    pub data: serde_json::Value,
}

pub async fn message_impl(worker: &ServiceWorker, params: SwMessageParams) -> Result<CallToolResult, McpError> {
    let outcome = worker.handle_message(&params.data).await?;
    json_result(&outcome)
}
