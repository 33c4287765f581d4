//! Commands the host page posts to the worker.

use serde::{Deserialize, Serialize};

/// A message from the page, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,

    /// Warm the runtime store with these URLs.
    #[serde(rename = "CACHE_URLS")]
    CacheUrls { urls: Vec<String> },

    #[serde(other)]
    Unknown,
}

impl WorkerMessage {
    /// Parse a message payload. Anything unrecognised is `Unknown`.
    pub fn parse(data: &serde_json::Value) -> Self {
        serde_json::from_value(data.clone()).unwrap_or(WorkerMessage::Unknown)
    }
}

/// What handling a message did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// A waiting worker was activated.
    Activated { deleted_stores: Vec<String> },
    /// No worker was waiting; activation will follow the next install.
    SkipWaitingPending,
    Cached { count: usize },
    Ignored,
}
