//! C5 Download Orchestrator: expands a run request into work items and runs
//! them with bounded parallelism, aggregating outcomes.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use futures::stream::{self, StreamExt as _};
use switchy_database::Database;
use tiger_catalog::Kind;
use tiger_directory_scraper::DirectoryScraper;

use crate::fetch::{self, FetchStatus};

/// Errors that can occur while planning or running an orchestrator pass.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The state store rejected a read or write.
    #[error("state store error: {0}")]
    StateStore(#[from] tiger_state_store::StateStoreError),
}

/// Shared configuration for a single orchestrator run.
pub struct RunRequest {
    pub year: u32,
    pub states: Vec<String>,
    pub kinds: Vec<Kind>,
    pub parallel: usize,
    pub output_root: PathBuf,
    pub retries: u32,
    pub timeout: Duration,
}

/// Aggregate outcome of a download pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOutcome {
    pub successful: u64,
    pub failed: u64,
    pub not_found: u64,
}

impl RunOutcome {
    fn record(&mut self, status: FetchStatus) {
        match status {
            FetchStatus::Ok => self.successful += 1,
            FetchStatus::NotFound => self.not_found += 1,
            FetchStatus::Failed => self.failed += 1,
        }
    }

    /// The process exit status this outcome implies: success iff nothing
    /// failed.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Restores `year`/`states`/`kinds` from a previously saved `config` row
/// when the request didn't specify them, logging that it did so.
///
/// # Errors
///
/// Returns [`OrchestratorError`] if the saved config can't be read.
pub async fn restore_config_if_unset(
    db: &dyn Database,
    year: Option<u32>,
    states: Vec<String>,
    kinds: Vec<String>,
) -> Result<(u32, Vec<String>, Vec<String>), OrchestratorError> {
    if year.is_some() && !states.is_empty() && !kinds.is_empty() {
        return Ok((year.unwrap_or_default(), states, kinds));
    }

    let Some(saved) = tiger_state_store::get_config(db).await? else {
        return Ok((year.unwrap_or(2025), states, kinds));
    };

    log::info!("orchestrator: restoring prior run configuration from state store");
    Ok((
        year.unwrap_or(saved.year),
        if states.is_empty() { saved.states } else { states },
        if kinds.is_empty() { saved.kinds } else { kinds },
    ))
}

/// **Discover-only** mode: runs the directory scraper for each requested
/// state, saves the discovered URL set and run configuration, and returns.
///
/// # Errors
///
/// Returns [`OrchestratorError`] if a state-store write fails.
pub async fn discover_only(
    db: &dyn Database,
    scraper: &DirectoryScraper,
    req: &RunRequest,
) -> Result<(), OrchestratorError> {
    for state_fips in &req.states {
        let by_kind = scraper
            .discover(&req.states, req.year, &req.kinds, Duration::from_secs(30))
            .await;

        let mut urls = std::collections::BTreeSet::new();
        for by_state in by_kind.values() {
            if let Some(set) = by_state.get(state_fips) {
                urls.extend(set.iter().cloned());
            }
        }

        tiger_state_store::set_discovered_urls(db, state_fips, &urls).await?;
    }

    let kind_names: Vec<String> = req.kinds.iter().map(|k| k.name().to_string()).collect();
    tiger_state_store::save_config(db, req.year, &req.states, &kind_names).await?;
    Ok(())
}

/// **Download pending** mode: for each requested state, reads the pending
/// URL set and fans it out to the HTTP fetcher with a semaphore of width
/// `req.parallel`.
///
/// # Errors
///
/// Returns [`OrchestratorError`] if reading pending URLs fails.
pub async fn download_pending(
    db: &dyn Database,
    client: &reqwest::Client,
    req: &RunRequest,
    cancelled: &AtomicBool,
) -> Result<RunOutcome, OrchestratorError> {
    let mut work = Vec::new();
    for state_fips in &req.states {
        for url in tiger_state_store::pending_urls(db, state_fips).await? {
            work.push((url, state_fips.clone()));
        }
    }

    Ok(run_fetches(db, client, req, work, cancelled).await)
}

/// **Download by enumeration** mode: for each `(state, county, kind)`
/// triple, composes the archive URL via the catalog and fans it out.
///
/// County enumeration uses the first county-level kind in `req.kinds` (or
/// the fixed odd-number fallback if the scraper finds none) as the
/// authoritative county list for a state; every requested kind is then
/// downloaded for that same county set.
pub async fn download_by_enumeration(
    db: &dyn Database,
    client: &reqwest::Client,
    scraper: &DirectoryScraper,
    req: &RunRequest,
    cancelled: &AtomicBool,
) -> Result<RunOutcome, OrchestratorError> {
    let enumeration_kind = req
        .kinds
        .iter()
        .copied()
        .find(|k| k.is_county_level())
        .or_else(|| req.kinds.first().copied());

    let mut work = Vec::new();
    for state_fips in &req.states {
        let counties: Vec<String> = if let Some(kind) = enumeration_kind {
            let found = scraper.enumerate_counties(state_fips, req.year, kind).await;
            if found.is_empty() {
                log::warn!(
                    "download_by_enumeration: no counties discovered for state {state_fips}, falling back to the static FIPS range"
                );
                tiger_catalog::static_county_fips_fallback()
            } else {
                found
            }
        } else {
            tiger_catalog::static_county_fips_fallback()
        };

        for kind in &req.kinds {
            if kind.is_county_level() {
                for county_fips in &counties {
                    let url = tiger_catalog::compose(req.year, state_fips, county_fips, *kind);
                    work.push((url, state_fips.clone()));
                }
            } else {
                let url = tiger_catalog::compose(req.year, state_fips, "", *kind);
                work.push((url, state_fips.clone()));
            }
        }
    }

    Ok(run_fetches(db, client, req, work, cancelled).await)
}

async fn run_fetches(
    db: &dyn Database,
    client: &reqwest::Client,
    req: &RunRequest,
    work: Vec<(String, String)>,
    cancelled: &AtomicBool,
) -> RunOutcome {
    let output_root = &req.output_root;
    let retries = req.retries;
    let timeout = req.timeout;

    let outcomes: Vec<_> = stream::iter(work.into_iter().map(|(url, state_fips)| {
        let dest_path = dest_path_for(output_root, &url);
        async move {
            fetch::fetch(db, client, &url, &dest_path, &state_fips, retries, timeout, cancelled).await
        }
    }))
    .buffer_unordered(req.parallel.max(1))
    .collect()
    .await;

    let mut outcome = RunOutcome::default();
    for o in outcomes {
        outcome.record(o.status);
    }
    outcome
}

fn dest_path_for(output_root: &Path, url: &str) -> PathBuf {
    let file_name = url.rsplit('/').next().unwrap_or(url);
    output_root.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dest_path_uses_trailing_url_segment() {
        let path = dest_path_for(
            Path::new("/out"),
            "https://www2.census.gov/geo/tiger/TIGER2025/EDGES/tl_2025_06001_edges.zip",
        );
        assert_eq!(path, PathBuf::from("/out/tl_2025_06001_edges.zip"));
    }

    #[test]
    fn run_outcome_succeeds_only_with_zero_failures() {
        let mut outcome = RunOutcome::default();
        outcome.record(FetchStatus::Ok);
        outcome.record(FetchStatus::NotFound);
        assert!(outcome.succeeded());

        outcome.record(FetchStatus::Failed);
        assert!(!outcome.succeeded());
    }
}
