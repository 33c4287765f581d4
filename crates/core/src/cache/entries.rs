//! Entry operations: match, put and inspect request -> response mappings.

use super::connection::CacheDb;
use super::hash::RequestKey;
use super::stores::ensure_store;
use crate::Error;
use crate::http::{Response, ResponseKind};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// Lightweight view of a stored entry, without its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntrySummary {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub body_len: u64,
    pub stored_at: String,
}

/// Columns owned by the closure that writes a row.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    response_type: &'static str,
    headers_json: String,
    body: bytes::Bytes,
    response_url: Option<String>,
}

impl EntryRow {
    fn new(key: &RequestKey, response: &Response) -> Result<Self, Error> {
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("unserializable headers for {key}: {e}")))?;
        Ok(Self {
            key_hash: key.hash(),
            method: key.method.clone(),
            url: key.url.clone(),
            status: response.status,
            response_type: response.kind.as_str(),
            headers_json,
            body: response.body.clone(),
            response_url: response.url.clone(),
        })
    }
}

fn row_to_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<Response> {
    let status: i64 = row.get(0)?;
    let kind: String = row.get(1)?;
    let headers_json: String = row.get(2)?;
    let body: Vec<u8> = row.get(3)?;
    let url: Option<String> = row.get(4)?;

    let headers = match serde_json::from_str(&headers_json) {
        Ok(h) => h,
        Err(e) => {
            tracing::warn!("dropping unreadable cached headers: {}", e);
            Vec::new()
        }
    };

    Ok(Response {
        status: u16::try_from(status).unwrap_or(0),
        kind: ResponseKind::parse(&kind).unwrap_or(ResponseKind::Basic),
        headers,
        body: body.into(),
        url,
    })
}

impl CacheDb {
    /// Look up a response by request key.
    ///
    /// With `store` set, only that store is searched. Without it, every store
    /// is searched in creation order and the first hit wins. Only `GET`
    /// requests ever match.
    pub async fn match_entry(&self, store: Option<&str>, key: &RequestKey) -> Result<Option<Response>, Error> {
        if key.method != "GET" {
            return Ok(None);
        }

        let store = store.map(str::to_string);
        let key_hash = key.hash();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let result = match &store {
                    Some(name) => conn.query_row(
                        "SELECT e.status, e.response_type, e.headers_json, e.body, e.response_url
                         FROM cache_entries e JOIN cache_stores s ON s.id = e.store_id
                         WHERE s.name = ?1 AND e.key_hash = ?2",
                        params![name, key_hash],
                        row_to_response,
                    ),
                    None => conn.query_row(
                        "SELECT e.status, e.response_type, e.headers_json, e.body, e.response_url
                         FROM cache_entries e JOIN cache_stores s ON s.id = e.store_id
                         WHERE e.key_hash = ?1
                         ORDER BY s.id ASC LIMIT 1",
                        params![key_hash],
                        row_to_response,
                    ),
                };

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace a single entry. Last write wins.
    pub async fn put_entry(&self, store: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        self.put_entries(store, &[(key.clone(), response.clone())])
            .await
            .map(|_| ())
    }

    /// Write several entries in one transaction.
    ///
    /// Either every entry is stored or none is. Creates the store if needed.
    pub async fn put_entries(&self, store: &str, entries: &[(RequestKey, Response)]) -> Result<usize, Error> {
        if let Some((key, _)) = entries.iter().find(|(key, _)| key.method != "GET") {
            return Err(Error::InvalidInput(format!("only GET requests can be cached: {key}")));
        }

        let rows = entries
            .iter()
            .map(|(key, response)| EntryRow::new(key, response))
            .collect::<Result<Vec<_>, _>>()?;
        let store = store.to_string();

        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                let store_id = ensure_store(&tx, &store)?;
                let stored_at = chrono::Utc::now().to_rfc3339();

                for row in &rows {
                    tx.execute(
                        "INSERT INTO cache_entries (
                            store_id, key_hash, method, url, status, response_type,
                            headers_json, body, response_url, stored_at, body_len
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                        ON CONFLICT(store_id, key_hash) DO UPDATE SET
                            method = excluded.method,
                            url = excluded.url,
                            status = excluded.status,
                            response_type = excluded.response_type,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            response_url = excluded.response_url,
                            stored_at = excluded.stored_at,
                            body_len = excluded.body_len",
                        params![
                            store_id,
                            &row.key_hash,
                            &row.method,
                            &row.url,
                            row.status,
                            row.response_type,
                            &row.headers_json,
                            row.body.as_ref(),
                            &row.response_url,
                            &stored_at,
                            row.body.len() as i64,
                        ],
                    )?;
                }

                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove one entry. Returns false if it was not present.
    pub async fn delete_entry(&self, store: &str, key: &RequestKey) -> Result<bool, Error> {
        let store = store.to_string();
        let key_hash = key.hash();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries
                     WHERE key_hash = ?2 AND store_id = (SELECT id FROM cache_stores WHERE name = ?1)",
                    params![store, key_hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a store (zero if the store does not exist).
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries e JOIN cache_stores s ON s.id = e.store_id
                     WHERE s.name = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Summaries of every entry in a store, oldest first.
    pub async fn list_entries(&self, store: &str) -> Result<Vec<EntrySummary>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<EntrySummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.method, e.url, e.status, e.body_len, e.stored_at
                     FROM cache_entries e JOIN cache_stores s ON s.id = e.store_id
                     WHERE s.name = ?1
                     ORDER BY e.stored_at ASC, e.url ASC",
                )?;
                let entries = stmt
                    .query_map(params![store], |row| {
                        Ok(EntrySummary {
                            method: row.get(0)?,
                            url: row.get(1)?,
                            status: u16::try_from(row.get::<_, i64>(2)?).unwrap_or(0),
                            body_len: row.get::<_, i64>(3)? as u64,
                            stored_at: row.get(4)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await
            .map_err(Error::from)
    }
}
