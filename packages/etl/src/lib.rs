#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Builds the normalized address-lookup database from TIGER/Line county
//! extracts: schema management (C10), per-county ETL (C9), and the
//! pipeline coordinator that drives both over a directory of downloaded
//! archives (C11).

pub mod county;
pub mod linezip;
pub mod pipeline;
pub mod records;
pub mod schema;

pub use county::{process_county, process_county_with_chunk_size, CountyStats, DEFAULT_CHUNK_SIZE};
pub use pipeline::{run, PipelineConfig, PipelineStats};
pub use schema::{create_indexes, create_schema, load_place_gazetteer};

/// Errors that can occur anywhere in the ETL pipeline.
///
/// Per the spec's error-handling design, only setup-time and
/// database-identity failures (schema creation, opening the target
/// database) are meant to escape to the caller; per-county failures are
/// caught and logged by [`pipeline::run`] instead of propagating here.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    /// The target database rejected a statement.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A shapefile or dBase reader failed.
    #[error("reader error: {0}")]
    Reader(#[from] tiger_readers::ReaderError),

    /// An archive extraction failed.
    #[error("extraction error: {0}")]
    Extract(#[from] tiger_download::ExtractError),

    /// A filesystem operation (work dir creation/cleanup) failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
