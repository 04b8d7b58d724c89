//! Entry operations: match, put, delete, enumerate.
//!
//! Entries are keyed by request identity within a bucket. Only GET requests
//! with a successful response are accepted for storage.

use super::connection::CacheDb;
use super::hash::request_key;
use crate::Error;
use crate::http::{Request, Response, ResponseSource};
use bytes::Bytes;
use tokio_rusqlite::{params, rusqlite};
use url::Url;

/// Row payload prepared outside the database thread.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn prepare(request: &Request, response: &Response) -> Result<Self, Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!("cannot cache {} request", request.method)));
        }
        if !response.is_ok() {
            return Err(Error::InvalidInput(format!("refusing to cache status {}", response.status)));
        }

        Ok(Self {
            key_hash: request_key(&request.method, request.url.as_str()),
            method: request.method.clone(),
            url: request.url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers_json: serde_json::to_string(&response.headers)
                .map_err(|e| Error::CorruptEntry(e.to_string()))?,
            body: response.body.to_vec(),
        })
    }

    fn upsert(&self, conn: &rusqlite::Connection, bucket: &str, stored_at: &str) -> Result<(), Error> {
        conn.execute(
            "INSERT OR IGNORE INTO buckets (name, created_at) VALUES (?1, ?2)",
            params![bucket, stored_at],
        )?;
        conn.execute(
            "INSERT INTO entries (bucket, key_hash, method, url, status, status_text, headers_json, body, stored_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(bucket, key_hash) DO UPDATE SET
                status = excluded.status,
                status_text = excluded.status_text,
                headers_json = excluded.headers_json,
                body = excluded.body,
                stored_at = excluded.stored_at",
            params![
                bucket,
                &self.key_hash,
                &self.method,
                &self.url,
                self.status,
                &self.status_text,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

impl CacheDb {
    /// Look up the response stored for a request.
    ///
    /// Non-GET requests never match. Returns None if the bucket or the
    /// entry doesn't exist.
    pub async fn match_entry(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }
        let bucket = bucket.to_string();
        let key_hash = request_key(&request.method, request.url.as_str());
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, status_text, headers_json, body
                    FROM entries WHERE bucket = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![bucket, key_hash], |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                });

                let (status, status_text, headers_json, body) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let headers: Vec<(String, String)> =
                    serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;

                Ok(Some(Response {
                    status,
                    status_text,
                    headers,
                    body: Bytes::from(body),
                    source: ResponseSource::Cache,
                }))
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response for a request, replacing any previous entry.
    ///
    /// Opens the bucket if needed.
    pub async fn put_entry(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let row = EntryRow::prepare(request, response)?;
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                row.upsert(conn, &bucket, &chrono::Utc::now().to_rfc3339())
            })
            .await
            .map_err(Error::from)
    }

    /// Store several entries in one transaction: either all are written or
    /// none is.
    pub async fn put_entries(&self, bucket: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(req, resp)| EntryRow::prepare(req, resp))
            .collect::<Result<Vec<_>, _>>()?;
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let stored_at = chrono::Utc::now().to_rfc3339();
                for row in &rows {
                    row.upsert(&tx, &bucket, &stored_at)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for a request. Returns false if there was none.
    pub async fn delete_entry(&self, bucket: &str, request: &Request) -> Result<bool, Error> {
        let bucket = bucket.to_string();
        let key_hash = request_key(&request.method, request.url.as_str());
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count =
                    conn.execute("DELETE FROM entries WHERE bucket = ?1 AND key_hash = ?2", params![bucket, key_hash])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Requests stored in a bucket, oldest first.
    pub async fn entry_keys(&self, bucket: &str) -> Result<Vec<Request>, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<Request>, Error> {
                let mut stmt =
                    conn.prepare("SELECT method, url FROM entries WHERE bucket = ?1 ORDER BY stored_at ASC, rowid ASC")?;
                let rows = stmt
                    .query_map(params![bucket], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(method, url)| {
                        let url = Url::parse(&url).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
                        Ok(Request::new(&method, url))
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }

    pub async fn entry_count(&self, bucket: &str) -> Result<u64, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE bucket = ?1", params![bucket], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
