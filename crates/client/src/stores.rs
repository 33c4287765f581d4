//! Cache Store Manager.
//!
//! Sole writer of the named stores. Owns install-time population of the
//! precache and activate-time removal of stale stores.

use futures_util::future::try_join_all;
use swcache_core::{AppConfig, CacheDb, Error, InterceptedRequest, RequestKey, Response};
use url::Url;

use crate::fetch::Network;

/// Manages the current precache and runtime stores.
#[derive(Clone, Debug)]
pub struct StoreManager {
    db: CacheDb,
    precache: String,
    runtime: String,
}

impl StoreManager {
    pub fn new(db: CacheDb, precache: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self { db, precache: precache.into(), runtime: runtime.into() }
    }

    pub fn from_config(db: CacheDb, config: &AppConfig) -> Self {
        Self::new(db, config.precache_store(), config.runtime_store())
    }

    pub fn precache(&self) -> &str {
        &self.precache
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Names of the two current stores; everything else is stale.
    pub fn current_names(&self) -> Vec<String> {
        vec![self.precache.clone(), self.runtime.clone()]
    }

    /// Fetch the whole manifest and store it in the precache.
    ///
    /// All-or-nothing: every entry must fetch with an ok status before any
    /// is written, and the write itself is a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreWrite` naming the first entry that failed.
    pub async fn initialize_precache(&self, network: &dyn Network, manifest: &[Url]) -> Result<usize, Error> {
        let count = self.add_all(&self.precache, network, manifest).await?;
        tracing::info!(store = %self.precache, entries = count, "precache populated");
        Ok(count)
    }

    /// Fetch `urls` and store them all in `store`, atomically.
    pub async fn add_all(&self, store: &str, network: &dyn Network, urls: &[Url]) -> Result<usize, Error> {
        let fetches = urls.iter().map(|url| async move {
            let request = InterceptedRequest::get(url.clone());
            let response = network
                .fetch(&request)
                .await
                .map_err(|e| Error::StoreWrite(format!("{url}: {e}")))?;
            if !response.ok() {
                return Err(Error::StoreWrite(format!("{url}: status {}", response.status)));
            }
            Ok((RequestKey::get(url), response))
        });

        let entries = try_join_all(fetches).await?;

        self.db.open_store(store).await?;
        self.db.put_entries(store, &entries).await
    }

    /// Delete every store whose name is not in `current`.
    ///
    /// Returns the deleted names in enumeration order.
    pub async fn purge_stale_stores(&self, current: &[String]) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.db.store_names().await? {
            if current.contains(&name) {
                continue;
            }
            if self.db.delete_store(&name).await? {
                tracing::info!(store = %name, "deleted stale cache store");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Exact-match lookup in one store.
    pub async fn get(&self, store: &str, request: &InterceptedRequest) -> Result<Option<Response>, Error> {
        self.db.match_entry(Some(store), &key_for(request)).await
    }

    /// Lookup across stores: runtime first, then precache, then any store.
    pub async fn match_any(&self, request: &InterceptedRequest) -> Result<Option<Response>, Error> {
        let key = key_for(request);
        for store in [&self.runtime, &self.precache] {
            if let Some(hit) = self.db.match_entry(Some(store), &key).await? {
                return Ok(Some(hit));
            }
        }
        self.db.match_entry(None, &key).await
    }

    /// Store a response for the request. Last write wins.
    pub async fn put(&self, store: &str, request: &InterceptedRequest, response: &Response) -> Result<(), Error> {
        self.db.put_entry(store, &key_for(request), response).await
    }
}

fn key_for(request: &InterceptedRequest) -> RequestKey {
    RequestKey::new(&request.method, &request.url)
}
