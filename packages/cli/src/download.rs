//! `download`: drives the discovery + download engine (C1-C5) from CLI
//! flags, per spec §6.4's "flags of record" (names are suggestions; these
//! follow the spec's wording directly).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tiger_download::RunRequest;

use crate::CliError;

#[derive(Args)]
pub struct DownloadArgs {
    /// Vintage year, e.g. 2025. Defaults to a prior saved run's year, or
    /// 2025 if none was saved.
    #[arg(long)]
    pub year: Option<u32>,

    /// Comma-separated state/territory FIPS codes. Defaults to the 50
    /// states plus DC (plus territories if `--include-territories`).
    #[arg(long, value_delimiter = ',')]
    pub states: Vec<String>,

    /// Comma-separated dataset kinds (e.g. `EDGES,ADDR,FEATNAMES`).
    /// Defaults to the three kinds the ETL pipeline consumes.
    #[arg(long = "types", value_delimiter = ',')]
    pub kinds: Vec<String>,

    /// Width of the bounded concurrent-download pool.
    #[arg(long, default_value_t = 8)]
    pub parallel: usize,

    /// Per-HTTP-attempt timeout, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Retries per URL before demoting to `failed`.
    #[arg(long, default_value_t = 5)]
    pub retries: u32,

    /// Only scrape directory listings and persist discovered URLs; don't
    /// download anything.
    #[arg(long)]
    pub discover_only: bool,

    /// Print discovered/completed/failed/pending counts per state and exit.
    #[arg(long)]
    pub show_status: bool,

    /// Reconcile the state store against the filesystem under `--output`
    /// and exit.
    #[arg(long)]
    pub sync_state: bool,

    /// Include the five inhabited territories alongside the 50 states.
    #[arg(long)]
    pub include_territories: bool,

    /// Root directory downloaded archives (and the embedded state store)
    /// are written under.
    #[arg(long, default_value = "downloads")]
    pub output: PathBuf,

    /// Opts out of the embedded state store. Since a JSON-file fallback
    /// store isn't implemented, this only suppresses the state store's
    /// resumability guarantees within this run; a warning is logged.
    #[arg(long)]
    pub no_use_db: bool,
}

/// Runs the `download` subcommand. Returns `Ok(true)` on full success,
/// `Ok(false)` if any download failed (exit code 1), or
/// `Err(CliError::Interrupted)` on Ctrl-C (exit code 130).
pub async fn run(args: DownloadArgs, multi: &tiger_cli_utils::MultiProgress) -> Result<bool, CliError> {
    if args.no_use_db {
        log::warn!("download: --no-use-db requested, but no JSON-file fallback store exists; using the embedded store anyway");
    }

    std::fs::create_dir_all(&args.output)?;
    let state_db_path = args.output.join("state.sqlite");
    let db = tiger_state_store::open_db(&state_db_path).await?;

    let states = if args.states.is_empty() {
        let mut all: Vec<String> = tiger_catalog::states::FIFTY_STATE_FIPS.iter().map(|s| (*s).to_string()).collect();
        if args.include_territories {
            all.extend(tiger_catalog::states::TERRITORY_FIPS.iter().map(|s| (*s).to_string()));
        }
        all
    } else {
        args.states
    };

    let kinds: Vec<String> = if args.kinds.is_empty() {
        tiger_catalog::DEGAUSS_KINDS.iter().map(|k| k.name().to_string()).collect()
    } else {
        args.kinds
    };

    let (year, states, kind_names) =
        tiger_download::restore_config_if_unset(db.as_ref(), args.year, states, kinds).await?;

    let kinds: Vec<tiger_catalog::Kind> = kind_names
        .iter()
        .filter_map(|name| {
            let kind = tiger_catalog::kind_by_name(name);
            if kind.is_none() {
                log::warn!("download: unknown dataset kind '{name}', ignoring");
            }
            kind
        })
        .collect();

    if args.show_status {
        for state_fips in &states {
            let progress = tiger_state_store::download_progress(db.as_ref(), state_fips).await?;
            println!(
                "{state_fips}: discovered={} completed={} failed={} pending={}",
                progress.discovered, progress.completed, progress.failed, progress.pending
            );
        }
        return Ok(true);
    }

    if args.sync_state {
        tiger_state_store::reconcile_with_filesystem(db.as_ref(), &args.output, &states).await?;
        return Ok(true);
    }

    let req = RunRequest {
        year,
        states,
        kinds,
        parallel: args.parallel,
        output_root: args.output.clone(),
        retries: args.retries,
        timeout: Duration::from_secs(args.timeout),
    };

    let scraper = tiger_directory_scraper::DirectoryScraper::new();

    if args.discover_only {
        tiger_download::discover_only(db.as_ref(), &scraper, &req).await?;
        log::info!("download: discovery complete for {} state(s)", req.states.len());
        return Ok(true);
    }

    let cancelled = Arc::new(AtomicBool::new(false));
    let watcher = {
        let cancelled = Arc::clone(&cancelled);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancelled.store(true, Ordering::SeqCst);
            }
        })
    };

    let bar = tiger_cli_utils::spinner_bar(multi, "downloading TIGER/Line archives");
    let client = reqwest::Client::new();

    // A prior `--discover-only` run leaves `discovered_urls` populated for
    // these states; honor it by downloading exactly the pending set rather
    // than re-enumerating, per the spec's "discover-only then download"
    // scenario. With no prior discovery, enumerate URLs directly.
    let mut has_prior_discovery = false;
    for state_fips in &req.states {
        if let Some(summary) = tiger_state_store::state_summary(db.as_ref(), state_fips).await? {
            if summary.discovered > 0 {
                has_prior_discovery = true;
                break;
            }
        }
    }

    let outcome = if has_prior_discovery {
        tiger_download::download_pending(db.as_ref(), &client, &req, &cancelled).await?
    } else {
        tiger_download::download_by_enumeration(db.as_ref(), &client, &scraper, &req, &cancelled).await?
    };
    watcher.abort();
    bar.finish_and_clear();

    if cancelled.load(Ordering::SeqCst) {
        log::warn!(
            "download: interrupted; {} succeeded, {} failed, {} not found before cancellation",
            outcome.successful, outcome.failed, outcome.not_found
        );
        return Err(CliError::Interrupted);
    }

    log::info!(
        "download: {} succeeded, {} failed, {} not found",
        outcome.successful, outcome.failed, outcome.not_found
    );

    Ok(outcome.succeeded())
}
