//! User notifications and window clients.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use swcache_core::Error;
use url::Url;

/// Action id that opens the site root when clicked.
pub const EXPLORE_ACTION: &str = "explore";
pub const CLOSE_ACTION: &str = "close";

/// Fixed vibration pattern, in milliseconds.
pub const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// Displays and dismisses notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;

    async fn close(&self, title: &str) -> Result<(), Error>;
}

/// Pages controlled by the worker.
#[async_trait]
pub trait WindowClients: Send + Sync {
    /// Take control of every open page. Returns how many were claimed.
    async fn claim(&self) -> Result<usize, Error>;

    async fn open_window(&self, url: &Url) -> Result<(), Error>;
}
