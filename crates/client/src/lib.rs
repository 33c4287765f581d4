//! Offline worker runtime for swcache.
//!
//! Request routing, the four caching strategies, the cache store manager and
//! the worker lifecycle. The network and the host (notifications, windows)
//! are traits so the server can plug in real implementations and tests can
//! plug in fakes.

pub mod fetch;
pub mod router;
pub mod stores;
pub mod strategy;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchClient, FetchConfig, Network};
pub use router::{Router, RoutingDecision};
pub use stores::StoreManager;
pub use strategy::{ResponseSource, Served};
pub use worker::{
    ActivateReport, ClickOutcome, FetchOutcome, InstallReport, LifecycleState, MessageOutcome, Notification,
    Notifier, ServiceWorker, SyncOutcome, WindowClients, WorkerStatus,
};
