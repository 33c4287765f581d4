//! sw_sync and sw_periodic_sync.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{ServiceWorker, SyncOutcome};

use super::json_result;
use crate::error::HandlerError;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync tag, e.g. `sync-contact-forms` or `update-content`.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwSyncOutput {
    pub tag: String,
    pub outcome: SyncOutcome,
}

fn validate(params: &SwSyncParams) -> Result<(), HandlerError> {
    if params.tag.trim().is_empty() {
        return Err(HandlerError::InvalidInput("tag cannot be empty".into()));
    }
    Ok(())
}

pub async fn sync_impl(worker: &ServiceWorker, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    validate(&params)?;
    let outcome = worker.handle_sync(&params.tag).await;
    json_result(&SwSyncOutput { tag: params.tag, outcome })
}

pub async fn periodic_sync_impl(worker: &ServiceWorker, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    validate(&params)?;
    let outcome = worker.handle_periodic_sync(&params.tag).await;
    json_result(&SwSyncOutput { tag: params.tag, outcome })
}
