//! MCP tool implementations.
//!
//! Each tool is a plain `*_impl` function over the worker so it can be tested
//! without a transport. Outputs are pretty-printed JSON text content.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod push;
pub mod sync;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::HandlerError;

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| HandlerError::Output(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
