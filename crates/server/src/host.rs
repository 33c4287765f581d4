//! Host environment for the stdio server.
//!
//! There is no browser behind the server, so notifications and window
//! requests are logged and remembered. Claiming controls every window the
//! worker has opened so far.

use std::sync::Mutex;

use async_trait::async_trait;
use swcache_client::{Notification, Notifier, WindowClients};
use swcache_core::Error;
use url::Url;

#[derive(Debug, Default)]
pub struct StdioHost {
    visible: Mutex<Vec<Notification>>,
    windows: Mutex<Vec<Url>>,
}

impl StdioHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications shown and not yet closed.
    pub fn visible(&self) -> Vec<Notification> {
        self.visible.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn windows(&self) -> Vec<String> {
        self.windows
            .lock()
            .map(|w| w.iter().map(Url::to_string).collect())
            .unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::HandlerAborted("host state lock poisoned".into())
}

#[async_trait]
impl Notifier for StdioHost {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, body = %notification.body, "show notification");
        self.visible.lock().map_err(poisoned)?.push(notification.clone());
        Ok(())
    }

    async fn close(&self, title: &str) -> Result<(), Error> {
        let mut visible = self.visible.lock().map_err(poisoned)?;
        let before = visible.len();
        visible.retain(|n| n.title != title);
        tracing::info!(title, closed = before - visible.len(), "close notification");
        Ok(())
    }
}

#[async_trait]
impl WindowClients for StdioHost {
    async fn claim(&self) -> Result<usize, Error> {
        let count = self.windows.lock().map_err(poisoned)?.len();
        tracing::debug!(count, "claimed clients");
        Ok(count)
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        tracing::info!(%url, "open window");
        self.windows.lock().map_err(poisoned)?.push(url.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swcache_client::worker::NotificationData;

    fn notification(title: &str) -> Notification {
        Notification {
            title: title.into(),
            body: "body".into(),
            icon: String::new(),
            badge: String::new(),
            vibrate: vec![],
            data: NotificationData { date_of_arrival: 0, primary_key: 1 },
            actions: vec![],
        }
    }

    #[tokio::test]
    async fn test_close_removes_by_title() {
        let host = StdioHost::new();
        host.show(&notification("a")).await.unwrap();
        host.show(&notification("b")).await.unwrap();

        host.close("a").await.unwrap();

        let titles: Vec<_> = host.visible().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["b"]);
    }

    #[tokio::test]
    async fn test_claim_counts_opened_windows() {
        let host = StdioHost::new();
        assert_eq!(host.claim().await.unwrap(), 0);

        host.open_window(&Url::parse("https://iwex.example/").unwrap())
            .await
            .unwrap();
        assert_eq!(host.claim().await.unwrap(), 1);
        assert_eq!(host.windows(), vec!["https://iwex.example/"]);
    }
}
