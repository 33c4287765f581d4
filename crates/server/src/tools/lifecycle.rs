//! sw_install, sw_activate and sw_status.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;
use swcache_client::worker::WorkerStatus;
use swcache_client::{Notification, ServiceWorker};

use super::json_result;
use crate::host::StdioHost;

pub async fn install_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let report = worker.install().await?;
    json_result(&report)
}

pub async fn activate_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let report = worker.activate().await?;
    json_result(&report)
}

/// What the host has been asked to display.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct HostActivity {
    pub notifications: Vec<Notification>,
    pub windows: Vec<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct StatusOutput {
    #[serde(flatten)]
    pub worker: WorkerStatus,
    pub host: HostActivity,
}

pub async fn status_impl(worker: &ServiceWorker, host: &StdioHost) -> Result<CallToolResult, McpError> {
    let output = StatusOutput {
        worker: worker.status().await?,
        host: HostActivity { notifications: host.visible(), windows: host.windows() },
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{parse, worker};
    use serde_json::Value;

    #[tokio::test]
    async fn test_install_then_status() {
        let (worker, host) = worker().await;

        let result = install_impl(&worker).await.unwrap();
        let report: Value = parse(&result);
        assert_eq!(report["state"], "active");
        assert_eq!(report["precached"], 0);

        let status: Value = parse(&status_impl(&worker, &host).await.unwrap());
        assert_eq!(status["state"], "active");
        assert_eq!(status["precache"], "iwex-website-v1");
        assert_eq!(status["stores"][0]["name"], "iwex-website-v1");
        assert_eq!(status["host"]["windows"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_activate_before_install_is_an_error() {
        let (worker, _) = worker().await;
        let err = activate_impl(&worker).await.unwrap_err();
        assert_eq!(err.code.0, -32007);
    }
}
