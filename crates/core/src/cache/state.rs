//! Persisted worker activation.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// The store pair the worker last activated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedVersion {
    pub precache: String,
    pub runtime: String,
    pub activated_at: String,
}

impl ActivatedVersion {
    pub fn matches(&self, precache: &str, runtime: &str) -> bool {
        self.precache == precache && self.runtime == runtime
    }
}

impl CacheDb {
    /// Record a completed activation, replacing any earlier one.
    pub async fn record_activation(&self, precache: &str, runtime: &str) -> Result<(), Error> {
        let precache = precache.to_string();
        let runtime = runtime.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO worker_state (id, precache, runtime, activated_at) VALUES (1, ?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET
                        precache = excluded.precache,
                        runtime = excluded.runtime,
                        activated_at = excluded.activated_at",
                    params![precache, runtime, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// The last recorded activation, if any.
    pub async fn activated_version(&self) -> Result<Option<ActivatedVersion>, Error> {
        self.conn
            .call(|conn| -> Result<Option<ActivatedVersion>, Error> {
                let result = conn.query_row(
                    "SELECT precache, runtime, activated_at FROM worker_state WHERE id = 1",
                    [],
                    |row| Ok(ActivatedVersion { precache: row.get(0)?, runtime: row.get(1)?, activated_at: row.get(2)? }),
                );
                match result {
                    Ok(version) => Ok(Some(version)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}
