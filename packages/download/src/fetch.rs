//! C4 HTTP Fetcher: downloads a single URL with resume, retry, and backoff,
//! reporting every outcome to the state store.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::StreamExt as _;
use switchy_database::Database;
use tokio::io::AsyncWriteExt as _;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; tiger-geocoder/0.1; +https://www2.census.gov/geo/tiger/)";

/// How a single [`fetch`] call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The file is present at `dest_path` (freshly downloaded or already
    /// there from a prior run).
    Ok,
    /// The server returned 404 for the URL. Not retried: a missing archive
    /// is an expected outcome when probing speculative county/kind
    /// combinations, not a transient failure.
    NotFound,
    /// The retry budget was exhausted without completing.
    Failed,
}

/// The outcome of a single [`fetch`] call.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    pub url: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error("not found")]
    NotFound,
    #[error("cancelled")]
    Cancelled,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads `url` to `dest_path`, resuming from a sibling `.tmp` file if
/// one exists, retrying up to `retries` times with exponential backoff
/// (`min(2 * 2^k, 60)` seconds), and recording every outcome in the state
/// store.
///
/// `cancelled` is polled between chunks so a caller can request prompt,
/// cooperative cancellation (e.g. on Ctrl-C) without waiting for the
/// current attempt's timeout.
#[allow(clippy::too_many_arguments)]
pub async fn fetch(
    db: &dyn Database,
    client: &reqwest::Client,
    url: &str,
    dest_path: &Path,
    state_fips: &str,
    retries: u32,
    timeout: Duration,
    cancelled: &AtomicBool,
) -> FetchOutcome {
    let dest_str = dest_path.to_string_lossy().to_string();

    if dest_path.exists() {
        #[allow(clippy::cast_possible_wrap)]
        let size = std::fs::metadata(dest_path).map(|m| m.len()).unwrap_or(0) as i64;
        if let Err(e) = tiger_state_store::mark_completed(db, url, &dest_str, state_fips, size).await {
            log::warn!("fetch: failed to record completed state for {url}: {e}");
        }
        return FetchOutcome {
            status: FetchStatus::Ok,
            url: url.to_string(),
            message: "already present".to_string(),
        };
    }

    if let Some(parent) = dest_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return FetchOutcome {
                status: FetchStatus::Failed,
                url: url.to_string(),
                message: format!("failed to create {}: {e}", parent.display()),
            };
        }
    }

    let tmp_path = PathBuf::from(format!("{}.tmp", dest_path.display()));
    let mut last_error = String::new();

    for k in 0..retries {
        if cancelled.load(Ordering::Relaxed) {
            return FetchOutcome {
                status: FetchStatus::Failed,
                url: url.to_string(),
                message: "cancelled".to_string(),
            };
        }

        match attempt(client, url, &tmp_path, dest_path, timeout, cancelled).await {
            Ok(()) => {
                #[allow(clippy::cast_possible_wrap)]
                let size = std::fs::metadata(dest_path).map(|m| m.len()).unwrap_or(0) as i64;
                if let Err(e) =
                    tiger_state_store::mark_completed(db, url, &dest_str, state_fips, size).await
                {
                    log::warn!("fetch: failed to record completed state for {url}: {e}");
                }
                return FetchOutcome {
                    status: FetchStatus::Ok,
                    url: url.to_string(),
                    message: "downloaded".to_string(),
                };
            }
            Err(AttemptError::NotFound) => {
                return FetchOutcome {
                    status: FetchStatus::NotFound,
                    url: url.to_string(),
                    message: "404 not found".to_string(),
                };
            }
            Err(AttemptError::Cancelled) => {
                record_partial(db, url, &tmp_path, state_fips).await;
                return FetchOutcome {
                    status: FetchStatus::Failed,
                    url: url.to_string(),
                    message: "cancelled".to_string(),
                };
            }
            Err(e) => {
                last_error = e.to_string();
                record_partial(db, url, &tmp_path, state_fips).await;
            }
        }

        let backoff_secs = 2u64.saturating_mul(2u64.saturating_pow(k)).min(60);
        log::warn!("fetch: attempt {} for {url} failed ({last_error}), retrying in {backoff_secs}s", k + 1);
        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
    }

    if let Err(e) = tiger_state_store::mark_failed(db, url, &dest_str, &last_error, state_fips).await {
        log::warn!("fetch: failed to record failed state for {url}: {e}");
    }
    FetchOutcome {
        status: FetchStatus::Failed,
        url: url.to_string(),
        message: last_error,
    }
}

async fn record_partial(db: &dyn Database, url: &str, tmp_path: &Path, state_fips: &str) {
    #[allow(clippy::cast_possible_wrap)]
    let bytes = std::fs::metadata(tmp_path).map(|m| m.len()).unwrap_or(0) as i64;
    if let Err(e) =
        tiger_state_store::mark_partial(db, url, &tmp_path.to_string_lossy(), bytes, state_fips).await
    {
        log::warn!("fetch: failed to record partial state for {url}: {e}");
    }
}

async fn attempt(
    client: &reqwest::Client,
    url: &str,
    tmp_path: &Path,
    dest_path: &Path,
    timeout: Duration,
    cancelled: &AtomicBool,
) -> Result<(), AttemptError> {
    let resume = std::fs::metadata(tmp_path).map(|m| m.len()).unwrap_or(0);

    let mut request = client
        .get(url)
        .timeout(timeout)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .header(reqwest::header::ACCEPT, "*/*");
    if resume > 0 {
        request = request.header(reqwest::header::RANGE, format!("bytes={resume}-"));
    }

    let response = request.send().await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(AttemptError::NotFound);
    }
    let response = response.error_for_status()?;

    let mut file = if resume > 0 && response.status() == reqwest::StatusCode::PARTIAL_CONTENT {
        tokio::fs::OpenOptions::new()
            .append(true)
            .open(tmp_path)
            .await?
    } else {
        tokio::fs::File::create(tmp_path).await?
    };

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        if cancelled.load(Ordering::Relaxed) {
            return Err(AttemptError::Cancelled);
        }
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(tmp_path, dest_path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_and_caps_at_sixty() {
        let backoffs: Vec<u64> = (0..10)
            .map(|k: u32| 2u64.saturating_mul(2u64.saturating_pow(k)).min(60))
            .collect();
        assert_eq!(backoffs[0], 2);
        assert_eq!(backoffs[1], 4);
        assert_eq!(backoffs[2], 8);
        assert_eq!(*backoffs.last().unwrap(), 60);
        assert!(backoffs.iter().all(|&b| b <= 60));
    }
}
