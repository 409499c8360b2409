//! C6 Archive Extractor: expands downloaded archives to a working
//! directory, filtering by the TIGER/Line filename grammar.

use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// Errors that can occur while extracting a single archive.
///
/// Corrupt or non-archive input is not an error the extractor itself
/// raises: callers of [`extract`] only ever see [`ExtractError`] for
/// filesystem failures; per-archive parse failures are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("I/O error reading {path}: {source}")]
    Io { path: String, source: std::io::Error },
}

fn filename_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^tl_(\d{4})_(\d{2,5})_([a-z0-9]+)\.zip$").expect("static pattern")
    })
}

/// Filters matching archive filenames against optional request constraints.
struct Filter<'a> {
    year: Option<u32>,
    state_fips: Option<&'a str>,
    county_fips: Option<&'a str>,
    kind: Option<&'a str>,
}

impl Filter<'_> {
    fn matches(&self, file_name: &str) -> bool {
        let Some(caps) = filename_pattern().captures(file_name) else {
            return false;
        };

        if let Some(year) = self.year {
            if &caps[1] != year.to_string() {
                return false;
            }
        }

        let fips = &caps[2];
        if let Some(state_fips) = self.state_fips {
            if !fips.starts_with(state_fips) {
                return false;
            }
        }
        if let Some(county_fips) = self.county_fips {
            if !fips.ends_with(county_fips) || fips.len() < 5 {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if !caps[3].eq_ignore_ascii_case(kind) {
                return false;
            }
        }

        true
    }
}

/// Enumerates archives under `input_dir` (optionally recursive), keeps
/// those matching the TIGER/Line filename grammar and the given filters,
/// and extracts each into `output_dir/{archive_stem}/`.
///
/// Corrupt or non-archive files are logged and skipped rather than
/// aborting the whole pass. Returns the list of extraction directories
/// produced.
///
/// # Errors
///
/// Returns [`ExtractError`] if `input_dir` itself cannot be read.
#[allow(clippy::too_many_arguments)]
pub fn extract(
    input_dir: &Path,
    output_dir: &Path,
    recursive: bool,
    state_fips: Option<&str>,
    kind: Option<&str>,
    year: Option<u32>,
    county_fips: Option<&str>,
) -> Result<Vec<PathBuf>, ExtractError> {
    let filter = Filter { year, state_fips, county_fips, kind };
    let mut extracted = Vec::new();

    for path in enumerate_archives(input_dir, recursive)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !filter.matches(file_name) {
            continue;
        }

        let stem = file_name.trim_end_matches(".zip");
        let dest = output_dir.join(stem);

        match extract_one(&path, &dest) {
            Ok(()) => extracted.push(dest),
            Err(e) => log::warn!("extract: skipping {}: {e}", path.display()),
        }
    }

    Ok(extracted)
}

fn enumerate_archives(input_dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ExtractError> {
    let mut archives = Vec::new();
    let entries = std::fs::read_dir(input_dir).map_err(|e| ExtractError::Io {
        path: input_dir.display().to_string(),
        source: e,
    })?;

    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();

        if path.is_dir() {
            if recursive {
                archives.extend(enumerate_archives(&path, recursive)?);
            }
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) == Some("zip") {
            archives.push(path);
        }
    }

    Ok(archives)
}

fn extract_one(archive_path: &Path, dest_dir: &Path) -> Result<(), String> {
    let file = File::open(archive_path).map_err(|e| e.to_string())?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;

    std::fs::create_dir_all(dest_dir).map_err(|e| e.to_string())?;

    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(e) => e,
            Err(e) => {
                log::warn!("extract: skipping corrupt entry {i} in {}: {e}", archive_path.display());
                continue;
            }
        };

        let Some(enclosed) = entry.enclosed_name() else {
            log::warn!(
                "extract: skipping entry with unsafe path in {}",
                archive_path.display()
            );
            continue;
        };

        let out_path = dest_dir.join(enclosed);
        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| e.to_string())?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let mut out_file = File::create(&out_path).map_err(|e| e.to_string())?;
        std::io::copy(&mut entry, &mut out_file).map_err(|e| e.to_string())?;
        out_file.flush().map_err(|e| e.to_string())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_on_year_state_and_kind() {
        let filter = Filter { year: Some(2025), state_fips: Some("06"), county_fips: None, kind: Some("edges") };
        assert!(filter.matches("tl_2025_06001_edges.zip"));
        assert!(!filter.matches("tl_2024_06001_edges.zip"));
        assert!(!filter.matches("tl_2025_36001_edges.zip"));
        assert!(!filter.matches("tl_2025_06001_addr.zip"));
    }

    #[test]
    fn filter_matches_county_suffix() {
        let filter = Filter { year: None, state_fips: None, county_fips: Some("001"), kind: None };
        assert!(filter.matches("tl_2025_06001_edges.zip"));
        assert!(!filter.matches("tl_2025_06037_edges.zip"));
        assert!(!filter.matches("tl_2025_06_place.zip"));
    }

    #[test]
    fn non_matching_filenames_are_rejected() {
        let filter = Filter { year: None, state_fips: None, county_fips: None, kind: None };
        assert!(!filter.matches("readme.txt"));
        assert!(!filter.matches("tl_2025_06001_edges.shp"));
    }
}
