#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Persists per-URL download lifecycle, per-state counters, discovered-URL
//! sets, and saved run configuration; reconciles its records against the
//! filesystem.
//!
//! `SQLite` via `switchy_database` is the preferred back-end; [`export_json`]
//! provides the JSON-snapshot view the spec allows as a fallback for
//! inspection (a full JSON-file back-end is not implemented, since every
//! caller in this crate targets the embedded store).

use std::collections::BTreeSet;
use std::path::Path;

use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;
use tiger_state_store_models::{
    DiscoveredUrl, DownloadProgress, FileRecord, FileStatus, ListType, RunConfig, StateCounters,
    UrlListEntry,
};

/// Errors that can occur during state-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed (e.g., creating the database file, walking
    /// the output root during reconciliation).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The saved `config` JSON could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, StateStoreError>;

fn db_err<E: std::fmt::Display>(e: E) -> StateStoreError {
    StateStoreError::Database(e.to_string())
}

/// Opens (or creates) the state-store `SQLite` database at `path` and
/// ensures all tables exist.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the database file cannot be created or the
/// schema DDL fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(db_err)?;
    ensure_schema(db.as_ref()).await?;
    Ok(db)
}

async fn ensure_schema(db: &dyn Database) -> Result<()> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS file_record (
            path TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            status TEXT NOT NULL,
            state_fips TEXT NOT NULL,
            size INTEGER,
            bytes_downloaded INTEGER,
            error TEXT,
            timestamp TEXT NOT NULL
        )",
    )
    .await
    .map_err(db_err)?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS url_list (
            url TEXT PRIMARY KEY,
            list_type TEXT NOT NULL,
            added_at TEXT NOT NULL
        )",
    )
    .await
    .map_err(db_err)?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS state_counters (
            state_fips TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            failed INTEGER NOT NULL DEFAULT 0,
            discovered INTEGER NOT NULL DEFAULT 0,
            last_updated TEXT NOT NULL
        )",
    )
    .await
    .map_err(db_err)?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS discovered_urls (
            state_fips TEXT NOT NULL,
            url TEXT NOT NULL,
            discovered_at TEXT NOT NULL,
            PRIMARY KEY (state_fips, url)
        )",
    )
    .await
    .map_err(db_err)?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS config (
            id INTEGER PRIMARY KEY CHECK (id = 0),
            year INTEGER NOT NULL,
            states TEXT NOT NULL,
            kinds TEXT NOT NULL
        )",
    )
    .await
    .map_err(db_err)?;

    Ok(())
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

async fn touch_state_counter(db: &dyn Database, state_fips: &str) -> Result<()> {
    db.exec_raw_params(
        "INSERT INTO state_counters (state_fips, name, completed, failed, discovered, last_updated)
         VALUES (?, ?, 0, 0, 0, ?)
         ON CONFLICT(state_fips) DO UPDATE SET last_updated = excluded.last_updated",
        &[
            DatabaseValue::String(state_fips.to_string()),
            DatabaseValue::String(tiger_catalog::states::state_name(state_fips).to_string()),
            DatabaseValue::String(now()),
        ],
    )
    .await
    .map_err(db_err)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File lifecycle (C4 owns these three)
// ---------------------------------------------------------------------------

/// Upserts `file_record` to completed, upserts `url_list` to completed,
/// removes any failed `url_list` membership, and increments the state's
/// `completed` counter.
///
/// # Errors
///
/// Returns [`StateStoreError`] if any statement in the transaction fails.
pub async fn mark_completed(
    db: &dyn Database,
    url: &str,
    path: &str,
    state_fips: &str,
    size: i64,
) -> Result<()> {
    touch_state_counter(db, state_fips).await?;
    let ts = now();
    let txn = db.begin_transaction().await.map_err(db_err)?;

    txn.exec_raw_params(
        "INSERT INTO file_record (path, url, status, state_fips, size, bytes_downloaded, error, timestamp)
         VALUES (?, ?, 'completed', ?, ?, ?, NULL, ?)
         ON CONFLICT(path) DO UPDATE SET
             url = excluded.url, status = 'completed', state_fips = excluded.state_fips,
             size = excluded.size, bytes_downloaded = excluded.bytes_downloaded,
             error = NULL, timestamp = excluded.timestamp",
        &[
            DatabaseValue::String(path.to_string()),
            DatabaseValue::String(url.to_string()),
            DatabaseValue::String(state_fips.to_string()),
            DatabaseValue::Int64(size),
            DatabaseValue::Int64(size),
            DatabaseValue::String(ts.clone()),
        ],
    )
    .await
    .map_err(db_err)?;

    txn.exec_raw_params(
        "INSERT INTO url_list (url, list_type, added_at) VALUES (?, 'completed', ?)
         ON CONFLICT(url) DO UPDATE SET list_type = 'completed', added_at = excluded.added_at",
        &[DatabaseValue::String(url.to_string()), DatabaseValue::String(ts)],
    )
    .await
    .map_err(db_err)?;

    txn.exec_raw_params(
        "DELETE FROM url_list WHERE url = ? AND list_type = 'failed'",
        &[DatabaseValue::String(url.to_string())],
    )
    .await
    .map_err(db_err)?;

    txn.exec_raw_params(
        "UPDATE state_counters SET completed = completed + 1, last_updated = ? WHERE state_fips = ?",
        &[DatabaseValue::String(now()), DatabaseValue::String(state_fips.to_string())],
    )
    .await
    .map_err(db_err)?;

    txn.commit().await.map_err(db_err)?;
    Ok(())
}

/// Upserts `file_record` to failed, upserts `url_list` to failed, and
/// increments the state's `failed` counter.
///
/// # Errors
///
/// Returns [`StateStoreError`] if any statement in the transaction fails.
pub async fn mark_failed(
    db: &dyn Database,
    url: &str,
    path: &str,
    error: &str,
    state_fips: &str,
) -> Result<()> {
    touch_state_counter(db, state_fips).await?;
    let ts = now();
    let txn = db.begin_transaction().await.map_err(db_err)?;

    txn.exec_raw_params(
        "INSERT INTO file_record (path, url, status, state_fips, size, bytes_downloaded, error, timestamp)
         VALUES (?, ?, 'failed', ?, NULL, NULL, ?, ?)
         ON CONFLICT(path) DO UPDATE SET
             url = excluded.url, status = 'failed', state_fips = excluded.state_fips,
             error = excluded.error, timestamp = excluded.timestamp",
        &[
            DatabaseValue::String(path.to_string()),
            DatabaseValue::String(url.to_string()),
            DatabaseValue::String(state_fips.to_string()),
            DatabaseValue::String(error.to_string()),
            DatabaseValue::String(ts.clone()),
        ],
    )
    .await
    .map_err(db_err)?;

    txn.exec_raw_params(
        "INSERT INTO url_list (url, list_type, added_at) VALUES (?, 'failed', ?)
         ON CONFLICT(url) DO UPDATE SET list_type = 'failed', added_at = excluded.added_at",
        &[DatabaseValue::String(url.to_string()), DatabaseValue::String(ts)],
    )
    .await
    .map_err(db_err)?;

    txn.exec_raw_params(
        "UPDATE state_counters SET failed = failed + 1, last_updated = ? WHERE state_fips = ?",
        &[DatabaseValue::String(now()), DatabaseValue::String(state_fips.to_string())],
    )
    .await
    .map_err(db_err)?;

    txn.commit().await.map_err(db_err)?;
    Ok(())
}

/// Upserts `file_record` to partial, recording the current resume offset.
/// Does not touch `url_list` or the state counters.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the upsert fails.
pub async fn mark_partial(
    db: &dyn Database,
    url: &str,
    path: &str,
    bytes: i64,
    state_fips: &str,
) -> Result<()> {
    db.exec_raw_params(
        "INSERT INTO file_record (path, url, status, state_fips, size, bytes_downloaded, error, timestamp)
         VALUES (?, ?, 'partial', ?, NULL, ?, NULL, ?)
         ON CONFLICT(path) DO UPDATE SET
             url = excluded.url, status = 'partial', state_fips = excluded.state_fips,
             bytes_downloaded = excluded.bytes_downloaded, timestamp = excluded.timestamp",
        &[
            DatabaseValue::String(path.to_string()),
            DatabaseValue::String(url.to_string()),
            DatabaseValue::String(state_fips.to_string()),
            DatabaseValue::Int64(bytes),
            DatabaseValue::String(now()),
        ],
    )
    .await
    .map_err(db_err)?;
    Ok(())
}

/// Whether `path` is recorded as completed.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the query fails.
pub async fn is_completed(db: &dyn Database, path: &str) -> Result<bool> {
    let rows = db
        .query_raw_params(
            "SELECT status FROM file_record WHERE path = ?",
            &[DatabaseValue::String(path.to_string())],
        )
        .await
        .map_err(db_err)?;

    Ok(rows
        .first()
        .and_then(|r| r.to_value::<String>("status").ok())
        .is_some_and(|s| s == "completed"))
}

/// The resume offset recorded for a partial download at `path`, or 0 if
/// there is no partial record.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the query fails.
pub async fn get_partial_size(db: &dyn Database, path: &str) -> Result<i64> {
    let rows = db
        .query_raw_params(
            "SELECT bytes_downloaded FROM file_record WHERE path = ? AND status = 'partial'",
            &[DatabaseValue::String(path.to_string())],
        )
        .await
        .map_err(db_err)?;

    Ok(rows
        .first()
        .and_then(|r| r.to_value::<Option<i64>>("bytes_downloaded").ok().flatten())
        .unwrap_or(0))
}

// ---------------------------------------------------------------------------
// Discovery (C2 via C5 owns this)
// ---------------------------------------------------------------------------

/// Insert-or-ignores `urls` into `discovered_urls` for `state_fips`, and
/// refreshes `state_counters.discovered` to the state's total discovered
/// count.
///
/// # Errors
///
/// Returns [`StateStoreError`] if any statement in the transaction fails.
pub async fn set_discovered_urls(
    db: &dyn Database,
    state_fips: &str,
    urls: &BTreeSet<String>,
) -> Result<()> {
    touch_state_counter(db, state_fips).await?;
    let ts = now();
    let txn = db.begin_transaction().await.map_err(db_err)?;

    for url in urls {
        txn.exec_raw_params(
            "INSERT OR IGNORE INTO discovered_urls (state_fips, url, discovered_at) VALUES (?, ?, ?)",
            &[
                DatabaseValue::String(state_fips.to_string()),
                DatabaseValue::String(url.clone()),
                DatabaseValue::String(ts.clone()),
            ],
        )
        .await
        .map_err(db_err)?;
    }

    let rows = txn
        .query_raw_params(
            "SELECT COUNT(*) AS cnt FROM discovered_urls WHERE state_fips = ?",
            &[DatabaseValue::String(state_fips.to_string())],
        )
        .await
        .map_err(db_err)?;
    let count: i64 = rows.first().and_then(|r| r.to_value("cnt").ok()).unwrap_or(0);

    txn.exec_raw_params(
        "UPDATE state_counters SET discovered = ?, last_updated = ? WHERE state_fips = ?",
        &[
            DatabaseValue::Int64(count),
            DatabaseValue::String(now()),
            DatabaseValue::String(state_fips.to_string()),
        ],
    )
    .await
    .map_err(db_err)?;

    txn.commit().await.map_err(db_err)?;
    Ok(())
}

/// The set difference `discovered_urls(state) \ url_list({completed,failed})`.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the query fails.
pub async fn pending_urls(db: &dyn Database, state_fips: &str) -> Result<Vec<String>> {
    let rows = db
        .query_raw_params(
            "SELECT du.url FROM discovered_urls du
             LEFT JOIN url_list ul ON ul.url = du.url
             WHERE du.state_fips = ? AND ul.url IS NULL
             ORDER BY du.url ASC",
            &[DatabaseValue::String(state_fips.to_string())],
        )
        .await
        .map_err(db_err)?;

    Ok(rows
        .iter()
        .filter_map(|r| r.to_value::<String>("url").ok())
        .collect())
}

/// All URLs discovered for `state_fips`, regardless of `url_list` status.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the query fails.
pub async fn urls_for_state(db: &dyn Database, state_fips: &str) -> Result<Vec<DiscoveredUrl>> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM discovered_urls WHERE state_fips = ? ORDER BY url ASC",
            &[DatabaseValue::String(state_fips.to_string())],
        )
        .await
        .map_err(db_err)?;

    Ok(rows.iter().map(row_to_discovered_url).collect())
}

fn row_to_discovered_url(row: &switchy_database::Row) -> DiscoveredUrl {
    DiscoveredUrl {
        state_fips: row.to_value("state_fips").unwrap_or_default(),
        url: row.to_value("url").unwrap_or_default(),
        discovered_at: row.to_value("discovered_at").unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// The FIPS codes of every state with at least one `state_counters` row
/// (i.e. every state touched by a prior discovery or download run).
///
/// # Errors
///
/// Returns [`StateStoreError`] if the query fails.
pub async fn list_states_requested(db: &dyn Database) -> Result<Vec<String>> {
    let rows = db
        .query_raw_params("SELECT state_fips FROM state_counters ORDER BY state_fips ASC", &[])
        .await
        .map_err(db_err)?;

    Ok(rows
        .iter()
        .filter_map(|r| r.to_value::<String>("state_fips").ok())
        .collect())
}

/// The `state_counters` row for `state_fips`, if one has been created.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the query fails.
pub async fn state_summary(db: &dyn Database, state_fips: &str) -> Result<Option<StateCounters>> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM state_counters WHERE state_fips = ?",
            &[DatabaseValue::String(state_fips.to_string())],
        )
        .await
        .map_err(db_err)?;

    Ok(rows.first().map(row_to_state_counters))
}

fn row_to_state_counters(row: &switchy_database::Row) -> StateCounters {
    StateCounters {
        state_fips: row.to_value("state_fips").unwrap_or_default(),
        name: row.to_value("name").unwrap_or_default(),
        completed: row.to_value("completed").unwrap_or(0),
        failed: row.to_value("failed").unwrap_or(0),
        discovered: row.to_value("discovered").unwrap_or(0),
        last_updated: row.to_value("last_updated").unwrap_or_default(),
    }
}

/// Discovered/completed/failed/pending counts for `state_fips`.
///
/// # Errors
///
/// Returns [`StateStoreError`] if any underlying query fails.
pub async fn download_progress(db: &dyn Database, state_fips: &str) -> Result<DownloadProgress> {
    let discovered_urls = urls_for_state(db, state_fips).await?;
    let discovered = discovered_urls.len() as i64;

    let mut completed = 0i64;
    let mut failed = 0i64;
    for u in &discovered_urls {
        let rows = db
            .query_raw_params(
                "SELECT list_type FROM url_list WHERE url = ?",
                &[DatabaseValue::String(u.url.clone())],
            )
            .await
            .map_err(db_err)?;
        match rows.first().and_then(|r| r.to_value::<String>("list_type").ok()).as_deref() {
            Some("completed") => completed += 1,
            Some("failed") => failed += 1,
            _ => {}
        }
    }

    Ok(DownloadProgress {
        discovered,
        completed,
        failed,
        pending: discovered - completed - failed,
    })
}

/// Dumps every table to a JSON object, for the optional inspection export.
///
/// # Errors
///
/// Returns [`StateStoreError`] if any underlying query fails.
pub async fn export_json(db: &dyn Database) -> Result<serde_json::Value> {
    let states = list_states_requested(db).await?;
    let mut counters = Vec::new();
    for s in &states {
        if let Some(c) = state_summary(db, s).await? {
            counters.push(serde_json::to_value(c)?);
        }
    }

    let config = get_config(db).await?;

    Ok(serde_json::json!({
        "state_counters": counters,
        "config": config,
    }))
}

// ---------------------------------------------------------------------------
// Config (C5 exclusively mutates this)
// ---------------------------------------------------------------------------

/// Saves the single run configuration row, replacing any prior one.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the serialization or the upsert fails.
pub async fn save_config(db: &dyn Database, year: u32, states: &[String], kinds: &[String]) -> Result<()> {
    db.exec_raw_params(
        "INSERT INTO config (id, year, states, kinds) VALUES (0, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET year = excluded.year, states = excluded.states, kinds = excluded.kinds",
        &[
            DatabaseValue::Int64(i64::from(year)),
            DatabaseValue::String(serde_json::to_string(states)?),
            DatabaseValue::String(serde_json::to_string(kinds)?),
        ],
    )
    .await
    .map_err(db_err)?;
    Ok(())
}

/// Reads back the saved run configuration, if one has been written.
///
/// # Errors
///
/// Returns [`StateStoreError`] if the query or the deserialization fails.
pub async fn get_config(db: &dyn Database) -> Result<Option<RunConfig>> {
    let rows = db
        .query_raw_params("SELECT * FROM config WHERE id = 0", &[])
        .await
        .map_err(db_err)?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let year: i64 = row.to_value("year").unwrap_or(0);
    let states_json: String = row.to_value("states").unwrap_or_default();
    let kinds_json: String = row.to_value("kinds").unwrap_or_default();

    Ok(Some(RunConfig {
        #[allow(clippy::cast_sign_loss)]
        year: year as u32,
        states: serde_json::from_str(&states_json)?,
        kinds: serde_json::from_str(&kinds_json)?,
    }))
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// For each discovered URL belonging to one of `states` (all states, if
/// empty), checks whether the expected file exists under `output_root`:
/// - If it exists and isn't marked completed, marks it completed using the
///   on-disk size.
/// - If a `file_record` is completed but the file is missing, logs a
///   warning (the record is left untouched; re-downloading is the caller's
///   decision).
///
/// Safe to run at any time; never panics on a missing or unreadable file.
///
/// # Errors
///
/// Returns [`StateStoreError`] if any underlying query fails.
pub async fn reconcile_with_filesystem(
    db: &dyn Database,
    output_root: &Path,
    states: &[String],
) -> Result<()> {
    let requested = if states.is_empty() {
        list_states_requested(db).await?
    } else {
        states.to_vec()
    };

    for state_fips in requested {
        for discovered in urls_for_state(db, &state_fips).await? {
            let file_name = discovered
                .url
                .rsplit('/')
                .next()
                .unwrap_or(&discovered.url);
            let dest_path = output_root.join(file_name);

            match std::fs::metadata(&dest_path) {
                Ok(meta) => {
                    if !is_completed(db, &dest_path.to_string_lossy()).await? {
                        #[allow(clippy::cast_possible_wrap)]
                        let size = meta.len() as i64;
                        mark_completed(
                            db,
                            &discovered.url,
                            &dest_path.to_string_lossy(),
                            &state_fips,
                            size,
                        )
                        .await?;
                    }
                }
                Err(_) => {
                    if is_completed(db, &dest_path.to_string_lossy()).await? {
                        log::warn!(
                            "reconcile: {} is marked completed but missing on disk at {}",
                            discovered.url,
                            dest_path.display()
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> Box<dyn Database> {
        let db = init_sqlite_rusqlite(None).unwrap();
        ensure_schema(db.as_ref()).await.unwrap();
        db
    }

    #[tokio::test]
    async fn mark_completed_then_is_completed() {
        let db = memory_db().await;
        mark_completed(db.as_ref(), "https://example/a.zip", "/out/a.zip", "06", 100)
            .await
            .unwrap();
        assert!(is_completed(db.as_ref(), "/out/a.zip").await.unwrap());
    }

    #[tokio::test]
    async fn mark_failed_then_completed_clears_failed_membership() {
        let db = memory_db().await;
        mark_failed(db.as_ref(), "https://example/a.zip", "/out/a.zip", "boom", "06")
            .await
            .unwrap();
        mark_completed(db.as_ref(), "https://example/a.zip", "/out/a.zip", "06", 5)
            .await
            .unwrap();

        let rows = db
            .query_raw_params(
                "SELECT * FROM url_list WHERE url = ? AND list_type = 'failed'",
                &[DatabaseValue::String("https://example/a.zip".to_string())],
            )
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn partial_records_resume_offset() {
        let db = memory_db().await;
        mark_partial(db.as_ref(), "https://example/a.zip", "/out/a.zip.tmp", 42, "06")
            .await
            .unwrap();
        assert_eq!(get_partial_size(db.as_ref(), "/out/a.zip.tmp").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn pending_urls_excludes_completed_and_failed() {
        let db = memory_db().await;
        let urls: BTreeSet<String> = ["https://e/a.zip", "https://e/b.zip", "https://e/c.zip"]
            .into_iter()
            .map(String::from)
            .collect();
        set_discovered_urls(db.as_ref(), "06", &urls).await.unwrap();
        mark_completed(db.as_ref(), "https://e/a.zip", "/out/a.zip", "06", 1)
            .await
            .unwrap();
        mark_failed(db.as_ref(), "https://e/b.zip", "/out/b.zip", "oops", "06")
            .await
            .unwrap();

        let pending = pending_urls(db.as_ref(), "06").await.unwrap();
        assert_eq!(pending, vec!["https://e/c.zip".to_string()]);
    }

    #[tokio::test]
    async fn config_round_trips() {
        let db = memory_db().await;
        assert!(get_config(db.as_ref()).await.unwrap().is_none());

        save_config(db.as_ref(), 2023, &["06".to_string()], &["EDGES".to_string()])
            .await
            .unwrap();
        let cfg = get_config(db.as_ref()).await.unwrap().unwrap();
        assert_eq!(cfg.year, 2023);
        assert_eq!(cfg.states, vec!["06".to_string()]);
        assert_eq!(cfg.kinds, vec!["EDGES".to_string()]);

        save_config(db.as_ref(), 2024, &["36".to_string()], &["ADDR".to_string()])
            .await
            .unwrap();
        let cfg = get_config(db.as_ref()).await.unwrap().unwrap();
        assert_eq!(cfg.year, 2024);
    }

    #[tokio::test]
    async fn download_progress_counts() {
        let db = memory_db().await;
        let urls: BTreeSet<String> = ["https://e/a.zip", "https://e/b.zip"]
            .into_iter()
            .map(String::from)
            .collect();
        set_discovered_urls(db.as_ref(), "06", &urls).await.unwrap();
        mark_completed(db.as_ref(), "https://e/a.zip", "/out/a.zip", "06", 1)
            .await
            .unwrap();

        let progress = download_progress(db.as_ref(), "06").await.unwrap();
        assert_eq!(progress.discovered, 2);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.pending, 1);
    }
}
