#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Resumable HTTP fetcher (C4), bounded-concurrency download orchestrator
//! (C5), and ZIP archive extractor (C6) for TIGER/Line distribution
//! archives.

pub mod extract;
pub mod fetch;
pub mod orchestrator;

pub use extract::{extract, ExtractError};
pub use fetch::{fetch, FetchOutcome, FetchStatus};
pub use orchestrator::{
    discover_only, download_by_enumeration, download_pending, restore_config_if_unset,
    OrchestratorError, RunOutcome, RunRequest,
};
