//! In-process fakes for the network and host interfaces.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use swcache_core::{CacheDb, Error, InterceptedRequest, Response};
use url::Url;

use crate::fetch::Network;
use crate::stores::StoreManager;
use crate::worker::{Notification, Notifier, WindowClients};

pub const PRECACHE: &str = "iwex-website-v1";
pub const RUNTIME: &str = "iwex-runtime-v1";

/// Store manager over a fresh in-memory database.
pub async fn memory_stores() -> StoreManager {
    StoreManager::new(CacheDb::open_in_memory().await.unwrap(), PRECACHE, RUNTIME)
}

pub fn get(url: &str) -> InterceptedRequest {
    InterceptedRequest::get(Url::parse(url).unwrap())
}

pub fn nav(url: &str) -> InterceptedRequest {
    InterceptedRequest::navigation(Url::parse(url).unwrap())
}

/// Network that answers from a fixed table and records every call.
///
/// URLs without a scripted answer fail like an unreachable host.
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Response>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    delay_ms: AtomicU64,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, response: Response) -> Self {
        self.set(url, response);
        self
    }

    pub fn set(&self, url: &str, response: Response) {
        let url = Url::parse(url).unwrap().to_string();
        self.routes.lock().unwrap().insert(url, response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make every fetch take at least `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {url}")));
        }

        self.routes
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .ok_or_else(|| Error::Network(format!("unreachable: {url}")))
    }
}

/// Host that records notifications, closes, claims and opened windows.
#[derive(Default)]
pub struct RecordingHost {
    pub shown: Mutex<Vec<Notification>>,
    pub closed: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
    pub claims: Mutex<usize>,
    /// When set, claiming clients fails.
    pub refuse_claims: AtomicBool,
}

#[async_trait]
impl Notifier for RecordingHost {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close(&self, title: &str) -> Result<(), Error> {
        self.closed.lock().unwrap().push(title.to_string());
        Ok(())
    }
}

#[async_trait]
impl WindowClients for RecordingHost {
    async fn claim(&self) -> Result<usize, Error> {
        if self.refuse_claims.load(Ordering::SeqCst) {
            return Err(Error::HandlerAborted("clients.claim refused".into()));
        }
        *self.claims.lock().unwrap() += 1;
        Ok(1)
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
