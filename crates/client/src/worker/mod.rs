//! The offline worker: lifecycle, fetch interception and messaging.
//!
//! A [`ServiceWorker`] is an explicit, cloneable handle over the state the
//! host drives through events. Handlers that do cache or network work run
//! inside [`ServiceWorker::wait_until`], which spawns the work on the
//! worker's task tracker: it completes even if the caller goes away, and
//! [`ServiceWorker::shutdown`] waits for all of it before the host may stop.

mod lifecycle;
mod message;
mod notify;

pub use lifecycle::LifecycleState;
pub use message::{MessageOutcome, WorkerMessage};
pub use notify::{
    CLOSE_ACTION, EXPLORE_ACTION, Notification, NotificationAction, NotificationData, Notifier, VIBRATE_PATTERN,
    WindowClients,
};

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use swcache_core::{AppConfig, CacheDb, Error, InterceptedRequest, Response};
use tokio::sync::RwLock;
use tokio_util::task::TaskTracker;
use url::Url;

use crate::fetch::{Network, resolve};
use crate::router::{Router, RoutingDecision};
use crate::stores::StoreManager;
use crate::strategy::{self, ResponseSource};

/// Background sync tag for deferred contact-form submissions.
pub const CONTACT_FORM_SYNC_TAG: &str = "sync-contact-forms";

/// Periodic sync tag that refreshes the content endpoint.
pub const UPDATE_CONTENT_TAG: &str = "update-content";

/// Result of a successful install.
#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub precached: usize,
    pub state: LifecycleState,
    /// Present when activation followed immediately.
    pub activation: Option<ActivateReport>,
    /// Set when immediate activation was attempted and failed. The install
    /// itself still succeeded and the worker is left waiting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
pub struct ActivateReport {
    pub deleted_stores: Vec<String>,
    pub clients_claimed: usize,
}

/// A fetch event's answer.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// `None` when the page is not controlled and the request went straight
    /// to the network.
    pub decision: Option<RoutingDecision>,
    pub source: ResponseSource,
    pub response: Response,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct ClickOutcome {
    pub opened: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Refreshed,
    /// The endpoint answered with a non-ok status; cache left untouched.
    Unchanged,
    /// Best-effort work failed and was logged.
    Failed,
    /// Recognised, but deferred submissions are not persisted.
    Deferred,
    Ignored,
}

#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
pub struct StoreStatus {
    pub name: String,
    pub entries: u64,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
pub struct WorkerStatus {
    pub state: LifecycleState,
    pub origin: String,
    pub precache: String,
    pub runtime: String,
    pub stores: Vec<StoreStatus>,
    pub pending_tasks: usize,
}

/// Settings resolved once at registration.
struct Settings {
    origin: Url,
    manifest: Vec<Url>,
    content_endpoint: Url,
    skip_waiting: bool,
    notification_title: String,
    notification_body: String,
    notification_icon: String,
    notification_badge: String,
}

struct Inner {
    settings: Settings,
    router: Router,
    stores: StoreManager,
    network: Arc<dyn Network>,
    notifier: Arc<dyn Notifier>,
    clients: Arc<dyn WindowClients>,
    state: RwLock<LifecycleState>,
    skip_waiting_requested: AtomicBool,
    tasks: TaskTracker,
}

/// Handle to the worker. Cloning shares the same worker.
#[derive(Clone)]
pub struct ServiceWorker {
    inner: Arc<Inner>,
}

impl ServiceWorker {
    /// Register a worker against the configured origin.
    ///
    /// If the database records an activation of the current store pair, the
    /// worker resumes as active without reinstalling, so the cache serves
    /// immediately even when the network is down.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the origin, a manifest entry or the
    /// content endpoint cannot be resolved, or a database error if the
    /// activation record cannot be read.
    pub async fn new(
        config: &AppConfig, db: CacheDb, network: Arc<dyn Network>, notifier: Arc<dyn Notifier>,
        clients: Arc<dyn WindowClients>,
    ) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let resolve_url =
            |input: &str| resolve(&origin, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")));

        let manifest = config
            .precache_urls
            .iter()
            .map(|u| resolve_url(u))
            .collect::<Result<Vec<_>, _>>()?;
        let content_endpoint = resolve_url(&config.content_endpoint)?;

        let settings = Settings {
            origin: origin.clone(),
            manifest,
            content_endpoint,
            skip_waiting: config.skip_waiting,
            notification_title: config.notification_title.clone(),
            notification_body: config.notification_body.clone(),
            notification_icon: config.notification_icon.clone(),
            notification_badge: config.notification_badge.clone(),
        };

        let stores = StoreManager::from_config(db, config);
        let resumed = stores
            .db()
            .activated_version()
            .await?
            .is_some_and(|v| v.matches(stores.precache(), stores.runtime()));
        let state = if resumed { LifecycleState::Active } else { LifecycleState::Parsed };

        tracing::info!(
            origin = %origin,
            precache = %stores.precache(),
            runtime = %stores.runtime(),
            %state,
            "worker registered"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                router: Router::new(&origin, config.api_prefix.clone()),
                stores,
                settings,
                network,
                notifier,
                clients,
                state: RwLock::new(state),
                skip_waiting_requested: AtomicBool::new(false),
                tasks: TaskTracker::new(),
            }),
        })
    }

    pub async fn state(&self) -> LifecycleState {
        *self.inner.state.read().await
    }

    pub fn stores(&self) -> &StoreManager {
        &self.inner.stores
    }

    pub fn origin(&self) -> &Url {
        &self.inner.settings.origin
    }

    /// Run `work` to completion regardless of the caller.
    ///
    /// The work is tracked, so [`shutdown`](Self::shutdown) waits for it.
    pub async fn wait_until<F, T>(&self, work: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>> + Send + 'static,
        T: Send + 'static,
    {
        self.inner
            .tasks
            .spawn(work)
            .await
            .map_err(|e| Error::HandlerAborted(e.to_string()))?
    }

    /// Stop accepting lifetime extensions and wait for outstanding work.
    pub async fn shutdown(&self) {
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        tracing::info!("worker shut down");
    }

    async fn transition(
        &self, allowed: fn(&LifecycleState) -> bool, expected: &str, next: LifecycleState,
    ) -> Result<(), Error> {
        let mut state = self.inner.state.write().await;
        if !allowed(&*state) {
            return Err(Error::InvalidState { expected: expected.into(), actual: state.to_string() });
        }
        tracing::debug!(from = %*state, to = %next, "lifecycle transition");
        *state = next;
        Ok(())
    }

    async fn set_state(&self, next: LifecycleState) {
        *self.inner.state.write().await = next;
    }

    /// Install event: populate the precache.
    ///
    /// On failure the worker becomes redundant and the error propagates;
    /// install can be retried. With skip-waiting in effect, activation
    /// follows immediately; if that activation fails the install still
    /// succeeds, the worker stays waiting and the report carries the error.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(LifecycleState::can_install, "parsed or redundant", LifecycleState::Installing)
            .await?;
        tracing::info!("worker installing");

        let this = self.clone();
        let result = self
            .wait_until(async move {
                let inner = &this.inner;
                inner
                    .stores
                    .initialize_precache(inner.network.as_ref(), &inner.settings.manifest)
                    .await
            })
            .await;

        let precached = match result {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("install failed: {}", e);
                self.set_state(LifecycleState::Redundant).await;
                return Err(e);
            }
        };

        self.set_state(LifecycleState::Waiting).await;

        let skip_waiting =
            self.inner.settings.skip_waiting || self.inner.skip_waiting_requested.load(Ordering::SeqCst);
        let (activation, activation_error) = if skip_waiting {
            match self.activate().await {
                Ok(report) => (Some(report), None),
                Err(e) => (None, Some(e.to_string())),
            }
        } else {
            (None, None)
        };

        Ok(InstallReport { precached, state: self.state().await, activation, activation_error })
    }

    /// Activate event: purge stale stores, claim every open page, then
    /// record the activation so a restart resumes control.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.transition(LifecycleState::can_activate, "waiting", LifecycleState::Activating)
            .await?;
        tracing::info!("worker activating");

        let this = self.clone();
        let result = self
            .wait_until(async move {
                let inner = &this.inner;
                let deleted_stores = inner
                    .stores
                    .purge_stale_stores(&inner.stores.current_names())
                    .await?;
                let clients_claimed = inner.clients.claim().await?;
                inner
                    .stores
                    .db()
                    .record_activation(inner.stores.precache(), inner.stores.runtime())
                    .await?;
                Ok(ActivateReport { deleted_stores, clients_claimed })
            })
            .await;

        match result {
            Ok(report) => {
                self.set_state(LifecycleState::Active).await;
                tracing::info!(deleted = report.deleted_stores.len(), "worker active");
                Ok(report)
            }
            Err(e) => {
                tracing::error!("activation failed: {}", e);
                self.set_state(LifecycleState::Waiting).await;
                Err(e)
            }
        }
    }

    /// Fetch event.
    ///
    /// A controlled fetch always yields a response. An uncontrolled one goes
    /// straight to the network and may fail.
    pub async fn handle_fetch(&self, request: InterceptedRequest) -> Result<FetchOutcome, Error> {
        if !self.state().await.can_intercept_fetch() {
            let response = self.inner.network.fetch(&request).await?;
            return Ok(FetchOutcome { decision: None, source: ResponseSource::Network, response });
        }

        let decision = self.inner.router.route(&request);
        let this = self.clone();
        let served = self
            .wait_until(async move {
                let inner = &this.inner;
                Ok(strategy::execute(decision, &request, &inner.stores, inner.network.as_ref()).await)
            })
            .await?;

        Ok(FetchOutcome { decision: Some(decision), source: served.source, response: served.response })
    }

    /// Message event from the page.
    pub async fn handle_message(&self, data: &serde_json::Value) -> Result<MessageOutcome, Error> {
        match WorkerMessage::parse(data) {
            WorkerMessage::SkipWaiting => self.skip_waiting().await,
            WorkerMessage::CacheUrls { urls } => {
                let origin = &self.inner.settings.origin;
                let urls = urls
                    .iter()
                    .map(|u| resolve(origin, u).map_err(|e| Error::InvalidUrl(format!("{u}: {e}"))))
                    .collect::<Result<Vec<_>, _>>()?;

                let this = self.clone();
                let count = self
                    .wait_until(async move {
                        let inner = &this.inner;
                        inner
                            .stores
                            .add_all(inner.stores.runtime(), inner.network.as_ref(), &urls)
                            .await
                    })
                    .await?;
                tracing::info!(count, "warmed runtime cache");
                Ok(MessageOutcome::Cached { count })
            }
            WorkerMessage::Unknown => {
                tracing::debug!("ignoring unknown message");
                Ok(MessageOutcome::Ignored)
            }
        }
    }

    async fn skip_waiting(&self) -> Result<MessageOutcome, Error> {
        self.inner.skip_waiting_requested.store(true, Ordering::SeqCst);
        if self.state().await == LifecycleState::Waiting {
            let report = self.activate().await?;
            Ok(MessageOutcome::Activated { deleted_stores: report.deleted_stores })
        } else {
            Ok(MessageOutcome::SkipWaitingPending)
        }
    }

    /// Push event: display a notification built from the payload.
    pub async fn handle_push(&self, payload: Option<String>) -> Result<Notification, Error> {
        let notification = self.build_notification(payload);
        let notifier = self.inner.notifier.clone();
        let shown = notification.clone();
        self.wait_until(async move { notifier.show(&shown).await })
            .await?;
        tracing::info!(title = %notification.title, "notification shown");
        Ok(notification)
    }

    fn build_notification(&self, payload: Option<String>) -> Notification {
        let s = &self.inner.settings;
        let action = |action: &str, title: &str| NotificationAction {
            action: action.into(),
            title: title.into(),
            icon: s.notification_badge.clone(),
        };
        Notification {
            title: s.notification_title.clone(),
            body: payload.unwrap_or_else(|| s.notification_body.clone()),
            icon: s.notification_icon.clone(),
            badge: s.notification_badge.clone(),
            vibrate: VIBRATE_PATTERN.to_vec(),
            data: NotificationData { date_of_arrival: chrono::Utc::now().timestamp_millis(), primary_key: 1 },
            actions: vec![action(EXPLORE_ACTION, "View"), action(CLOSE_ACTION, "Close")],
        }
    }

    /// Notification click: dismiss, and open the site root for `explore`.
    pub async fn handle_notification_click(&self, action: Option<&str>) -> Result<ClickOutcome, Error> {
        self.inner
            .notifier
            .close(&self.inner.settings.notification_title)
            .await?;

        if action != Some(EXPLORE_ACTION) {
            return Ok(ClickOutcome { opened: None });
        }

        let root = self
            .inner
            .settings
            .origin
            .join("/")
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let clients = self.inner.clients.clone();
        let target = root.clone();
        self.wait_until(async move { clients.open_window(&target).await })
            .await?;

        Ok(ClickOutcome { opened: Some(root.to_string()) })
    }

    /// Background sync event.
    pub async fn handle_sync(&self, tag: &str) -> SyncOutcome {
        if tag != CONTACT_FORM_SYNC_TAG {
            tracing::debug!(tag, "ignoring sync event");
            return SyncOutcome::Ignored;
        }
        // Deferred submissions would need their own persistent queue; nothing
        // stores them yet.
        tracing::info!(tag, "contact form sync requested; no deferred submissions are stored");
        SyncOutcome::Deferred
    }

    /// Periodic sync event. Failures are logged and swallowed.
    pub async fn handle_periodic_sync(&self, tag: &str) -> SyncOutcome {
        if tag != UPDATE_CONTENT_TAG {
            tracing::debug!(tag, "ignoring periodic sync event");
            return SyncOutcome::Ignored;
        }

        let this = self.clone();
        match self.wait_until(async move { this.refresh_content().await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("error updating content: {}", e);
                SyncOutcome::Failed
            }
        }
    }

    async fn refresh_content(&self) -> Result<SyncOutcome, Error> {
        let inner = &self.inner;
        let request = InterceptedRequest::get(inner.settings.content_endpoint.clone());
        let response = inner.network.fetch(&request).await?;
        if !response.ok() {
            tracing::debug!(status = response.status, "content refresh skipped");
            return Ok(SyncOutcome::Unchanged);
        }
        inner
            .stores
            .put(inner.stores.runtime(), &request, &response)
            .await?;
        tracing::info!(url = %request.url, "content refreshed");
        Ok(SyncOutcome::Refreshed)
    }

    /// Snapshot of lifecycle state and store contents.
    pub async fn status(&self) -> Result<WorkerStatus, Error> {
        let stores = &self.inner.stores;
        let current = stores.current_names();
        let mut store_status = Vec::new();
        for name in stores.db().store_names().await? {
            store_status.push(StoreStatus {
                entries: stores.db().entry_count(&name).await?,
                current: current.contains(&name),
                name,
            });
        }

        Ok(WorkerStatus {
            state: self.state().await,
            origin: self.inner.settings.origin.origin().ascii_serialization(),
            precache: stores.precache().to_string(),
            runtime: stores.runtime().to_string(),
            stores: store_status,
            pending_tasks: self.inner.tasks.len(),
        })
    }
}
