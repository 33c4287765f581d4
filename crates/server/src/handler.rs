//! MCP server handler implementation.
//!
//! Each tool delivers one worker event (install, fetch, push, ...) and returns
//! the worker's answer as JSON.
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use swcache_client::ServiceWorker;

use crate::host::StdioHost;
use crate::tools::{
    cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl},
    fetch::{SwFetchParams, fetch_impl},
    lifecycle::{activate_impl, install_impl, status_impl},
    message::{SwMessageParams, message_impl},
    push::{SwNotificationClickParams, SwPushParams, click_impl, push_impl},
    sync::{SwSyncParams, periodic_sync_impl, sync_impl},
};

/// The MCP server handler for swcache.
#[derive(Clone)]
pub struct SwCacheServer {
    worker: ServiceWorker,
    host: Arc<StdioHost>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SwCacheServer {
    pub fn new(worker: ServiceWorker, host: Arc<StdioHost>) -> Self {
        Self { worker, host, tool_router: Self::tool_router() }
    }

    #[tool(description = "Run the install event: precache the manifest. Activates immediately when skip-waiting is in effect.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Run the activate event: delete stale cache stores and claim open pages.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Dispatch a request through the worker.
    ///
    /// Controlled requests always get a response; uncontrolled ones go to the
    /// network and may fail.
    #[tool(description = "Intercept a request: route it and serve it from cache, network or an offline fallback.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Post a message to the worker (SKIP_WAITING or CACHE_URLS). Unknown messages are ignored.")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message and show the resulting notification.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Handle a notification click. The explore action opens the site root.")]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        click_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a background sync event by tag.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a periodic sync event by tag. update-content refreshes the site content endpoint.")]
    async fn sw_periodic_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        periodic_sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Report lifecycle state, cache stores and host activity.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker, &self.host).await
    }

    #[tool(description = "Look up a cached response by URL, or list a store's entries.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }

    #[tool(description = "Delete a cache entry, a whole store, or every stale store.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
