#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the TIGER/Line geocoding database builder.
//!
//! `info types` / `info states` answer catalog questions with no I/O;
//! `download` drives the discovery + download engine (C1-C5); `import`
//! drives the county ETL pipeline (C7-C11). Exit codes follow the spec's
//! exit-code contract: `0` full success, `1` any failed download or county,
//! `130` user interruption.

mod download;
mod import;
mod info;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tiger_cli", about = "TIGER/Line geocoding database builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the dataset-kind and state/territory catalogs
    Info {
        #[command(subcommand)]
        what: info::InfoCommand,
    },
    /// Discover and/or download TIGER/Line archives
    Download(download::DownloadArgs),
    /// Build the address-lookup database from downloaded archives
    Import(import::ImportArgs),
}

/// Errors that escape a subcommand and determine the process exit code.
///
/// Only setup-time failures (state store / target database unreachable)
/// and user interruption are represented here; per-URL and per-county
/// failures are aggregated into the `Ok(bool)` success flag instead, per
/// the spec's error-handling design (§7).
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("interrupted")]
    Interrupted,

    #[error("state store error: {0}")]
    StateStore(#[from] tiger_state_store::StateStoreError),

    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] tiger_download::OrchestratorError),

    #[error("ETL error: {0}")]
    Etl(#[from] tiger_etl::EtlError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let multi = tiger_cli_utils::init_logger();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { what } => {
            info::run(what);
            Ok(true)
        }
        Commands::Download(args) => download::run(args, &multi).await,
        Commands::Import(args) => import::run(args, &multi),
    };

    match result {
        Ok(true) => ExitCode::from(0),
        Ok(false) => ExitCode::from(1),
        Err(CliError::Interrupted) => ExitCode::from(130),
        Err(e) => {
            log::error!("tiger_cli: {e}");
            ExitCode::from(1)
        }
    }
}
