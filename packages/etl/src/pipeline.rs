//! C11 Pipeline Coordinator: enumerates counties from a directory of
//! downloaded archives, extracts and ETLs each in isolation, and creates
//! indexes once at the end.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use rusqlite::Connection;

use crate::county::CountyStats;
use crate::EtlError;

fn archive_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^tl_(\d{4})_(\d{5})_([a-z0-9]+)\.zip$").expect("static pattern")
    })
}

/// A single county's worth of work: the archive to extract for each kind
/// the ETL needs (`edges`, `featnames`, `addr`).
struct CountyWork {
    year: u32,
    state_fips: String,
    county_fips: String,
    archives: BTreeMap<String, PathBuf>,
}

/// Inputs to a full pipeline run.
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub work_root: PathBuf,
    pub recursive: bool,
    pub state_fips: Option<String>,
    pub year: Option<u32>,
    /// Restrict to these county FIPS codes (3-digit), if given.
    pub counties: Option<Vec<String>>,
    /// Rows per multi-row `INSERT` statement; see [`crate::county::DEFAULT_CHUNK_SIZE`].
    pub chunk_size: usize,
}

/// Aggregate outcome of a full pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    pub counties_processed: u64,
    pub counties_failed: u64,
    pub edges: u64,
    pub features: u64,
    pub feature_edges: u64,
    pub ranges: u64,
}

/// Initializes schema, loads the gazetteer, processes every discovered
/// county (continuing past individual county failures), and defers index
/// creation until every county has landed.
///
/// Fatal only when schema creation fails; a failed county is logged and
/// the pipeline moves on to the next one.
///
/// # Errors
///
/// Returns [`EtlError`] if the schema cannot be created or the gazetteer
/// cannot be loaded.
pub fn run(conn: &mut Connection, cfg: &PipelineConfig) -> Result<PipelineStats, EtlError> {
    crate::schema::create_schema(conn)?;
    crate::schema::load_place_gazetteer(conn)?;

    let counties = discover_counties(
        &cfg.input_dir,
        cfg.recursive,
        cfg.state_fips.as_deref(),
        cfg.year,
        cfg.counties.as_deref(),
    )?;
    log::info!("pipeline: discovered {} counties to process", counties.len());

    let mut stats = PipelineStats::default();

    for county in counties {
        match process_one_county(conn, &cfg.input_dir, &cfg.work_root, &county, cfg.chunk_size) {
            Ok(county_stats) => {
                stats.counties_processed += 1;
                stats.edges += county_stats.edges;
                stats.features += county_stats.features;
                stats.feature_edges += county_stats.feature_edges;
                stats.ranges += county_stats.ranges;
            }
            Err(e) => {
                stats.counties_failed += 1;
                log::error!(
                    "pipeline: county {}{} failed, continuing: {e}",
                    county.state_fips,
                    county.county_fips
                );
            }
        }
    }

    crate::schema::create_indexes(conn);
    Ok(stats)
}

fn process_one_county(
    conn: &mut Connection,
    input_dir: &Path,
    work_root: &Path,
    county: &CountyWork,
    chunk_size: usize,
) -> Result<CountyStats, EtlError> {
    let work_dir = work_root.join(format!(
        "tiger-import-{}{}",
        county.state_fips, county.county_fips
    ));
    std::fs::create_dir_all(&work_dir)?;

    let result = (|| -> Result<CountyStats, EtlError> {
        for (kind, _) in &county.archives {
            tiger_download::extract(
                input_dir,
                &work_dir,
                false,
                Some(&county.state_fips),
                Some(kind.as_str()),
                Some(county.year),
                Some(&county.county_fips),
            )?;
        }

        let stem = |kind: &str| {
            format!("tl_{}_{}{}_{}", county.year, county.state_fips, county.county_fips, kind)
        };
        let edges_shp = work_dir.join(stem("edges")).join(format!("{}.shp", stem("edges")));
        let featnames_dbf = work_dir
            .join(stem("featnames"))
            .join(format!("{}.dbf", stem("featnames")));
        let addr_dbf = work_dir.join(stem("addr")).join(format!("{}.dbf", stem("addr")));

        crate::county::process_county_with_chunk_size(conn, &edges_shp, &featnames_dbf, &addr_dbf, chunk_size)
    })();

    if let Err(e) = std::fs::remove_dir_all(&work_dir) {
        log::warn!("pipeline: failed to clean up work dir {}: {e}", work_dir.display());
    }

    result
}

/// Walks `input_dir` (optionally recursive) for archive filenames matching
/// `tl_{year}_{SSCCC}_{kind}.zip`, groups them by `(year, state, county)`,
/// and keeps only groups carrying at least the `edges`, `featnames`, and
/// `addr` kinds, optionally filtered by `state_fips`/`year`.
fn discover_counties(
    input_dir: &Path,
    recursive: bool,
    state_fips: Option<&str>,
    year: Option<u32>,
    counties: Option<&[String]>,
) -> Result<Vec<CountyWork>, EtlError> {
    let mut groups: BTreeMap<(u32, String, String), BTreeMap<String, PathBuf>> = BTreeMap::new();

    for path in walk_zips(input_dir, recursive)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = archive_pattern().captures(file_name) else {
            continue;
        };

        let file_year: u32 = caps[1].parse().unwrap_or(0);
        if let Some(y) = year {
            if y != file_year {
                continue;
            }
        }

        let fips = &caps[2];
        let (state, county) = fips.split_at(2);
        if let Some(s) = state_fips {
            if s != state {
                continue;
            }
        }

        groups
            .entry((file_year, state.to_string(), county.to_string()))
            .or_default()
            .insert(caps[3].to_string(), path.clone());
    }

    let required = ["edges", "featnames", "addr"];
    let mut result = Vec::new();
    for ((file_year, state, county), archives) in groups {
        if let Some(allowed) = counties {
            if !allowed.iter().any(|c| c == &county) {
                continue;
            }
        }
        if required.iter().all(|k| archives.contains_key(*k)) {
            result.push(CountyWork { year: file_year, state_fips: state, county_fips: county, archives });
        } else {
            log::warn!("pipeline: county {state}{county} is missing one of edges/featnames/addr, skipping");
        }
    }

    Ok(result)
}

fn walk_zips(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, EtlError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                paths.extend(walk_zips(&path, recursive)?);
            }
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) == Some("zip") {
            paths.push(path);
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_pattern_captures_year_fips_and_kind() {
        let caps = archive_pattern().captures("tl_2025_06001_edges.zip").unwrap();
        assert_eq!(&caps[1], "2025");
        assert_eq!(&caps[2], "06001");
        assert_eq!(&caps[3], "edges");
    }

    #[test]
    fn discover_counties_requires_all_three_kinds() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["tl_2025_06001_edges.zip", "tl_2025_06001_addr.zip"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let counties = discover_counties(dir.path(), false, None, None, None).unwrap();
        assert!(counties.is_empty());
    }

    #[test]
    fn discover_counties_finds_complete_groups() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "tl_2025_06001_edges.zip",
            "tl_2025_06001_featnames.zip",
            "tl_2025_06001_addr.zip",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let counties = discover_counties(dir.path(), false, None, None, None).unwrap();
        assert_eq!(counties.len(), 1);
        assert_eq!(counties[0].state_fips, "06");
        assert_eq!(counties[0].county_fips, "001");
    }

    #[test]
    fn discover_counties_filters_by_county_list() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "tl_2025_06001_edges.zip",
            "tl_2025_06001_featnames.zip",
            "tl_2025_06001_addr.zip",
            "tl_2025_06003_edges.zip",
            "tl_2025_06003_featnames.zip",
            "tl_2025_06003_addr.zip",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let allowed = vec!["003".to_string()];
        let counties = discover_counties(dir.path(), false, None, None, Some(&allowed)).unwrap();
        assert_eq!(counties.len(), 1);
        assert_eq!(counties[0].county_fips, "003");
    }
}
