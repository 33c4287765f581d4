//! sw_push and sw_notification_click.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::ServiceWorker;

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Push payload text; used as the notification body when present.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// The action the user clicked (`explore` or `close`), if any.
    #[serde(default)]
    pub action: Option<String>,
}

pub async fn push_impl(worker: &ServiceWorker, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let notification = worker.handle_push(params.payload).await?;
    json_result(&notification)
}

pub async fn click_impl(
    worker: &ServiceWorker, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let outcome = worker.handle_notification_click(params.action.as_deref()).await?;
    json_result(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{parse, worker};
    use swcache_client::Notification;
    use swcache_client::worker::ClickOutcome;

    #[tokio::test]
    async fn test_push_then_explore() {
        let (worker, host) = worker().await;

        let result = push_impl(&worker, SwPushParams { payload: Some("Hello".into()) })
            .await
            .unwrap();
        let shown: Notification = parse(&result);
        assert_eq!(shown.body, "Hello");
        assert_eq!(host.visible().len(), 1);

        let result = click_impl(&worker, SwNotificationClickParams { action: Some("explore".into()) })
            .await
            .unwrap();
        let outcome: serde_json::Value = parse(&result);
        assert_eq!(outcome["opened"], "https://iwex.example/");
        assert!(host.visible().is_empty());
        assert_eq!(host.windows(), vec!["https://iwex.example/"]);
    }

    #[tokio::test]
    async fn test_click_without_action_only_closes() {
        let (worker, host) = worker().await;
        push_impl(&worker, SwPushParams { payload: None }).await.unwrap();

        let result = click_impl(&worker, SwNotificationClickParams { action: None }).await.unwrap();
        let outcome: serde_json::Value = parse(&result);
        assert_eq!(outcome, serde_json::to_value(ClickOutcome { opened: None }).unwrap());
        assert!(host.windows().is_empty());
    }
}
