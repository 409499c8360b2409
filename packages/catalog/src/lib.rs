#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset kind enumeration and archive URL composition for the Census
//! Bureau's TIGER/Line distribution.
//!
//! This crate is pure: it has no I/O and no knowledge of the download or
//! ETL layers. Everything downstream (the scraper, the orchestrator, the
//! pipeline coordinator) composes URLs and interprets kinds through the
//! functions here so the URL grammar only needs to be correct in one place.

pub mod states;

/// A TIGER/Line dataset kind, e.g. `EDGES` or `PLACE`.
///
/// The directory name on `www2.census.gov` and the lower-cased filename
/// segment are always derived from the same identifier (`EDGES` →
/// directory `EDGES`, filename segment `edges`), so `Kind` carries just the
/// upper-case name plus the handful of facts (county-level? national?) that
/// change how [`compose`] builds the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Kind(&'static str);

impl Kind {
    /// The upper-case directory/kind name, e.g. `"EDGES"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }

    /// The lower-case filename segment, e.g. `"edges"`.
    #[must_use]
    pub fn file_segment(self) -> String {
        self.0.to_lowercase()
    }

    /// Human-readable label for this kind, for `info types` output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        label_for(self.0)
    }

    /// Whether this kind is distributed one archive per county
    /// (`tl_{year}_{state}{county}_{kind}.zip`).
    #[must_use]
    pub fn is_county_level(self) -> bool {
        COUNTY_LEVEL_KINDS.contains(&self)
    }

    /// Whether this kind is the single national `STATE` boundary archive.
    #[must_use]
    pub const fn is_national(self) -> bool {
        matches!(self.0, "STATE")
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

const fn label_for(name: &'static str) -> &'static str {
    match name.as_bytes() {
        _ if const_str_eq(name, "EDGES") => "All Lines (roads, railroads, etc.)",
        _ if const_str_eq(name, "ADDR") => "Address Ranges",
        _ if const_str_eq(name, "FACES") => "Topological Faces (polygons)",
        _ if const_str_eq(name, "FEATNAMES") => "Feature Names",
        _ if const_str_eq(name, "PLACE") => "Places (cities, towns)",
        _ if const_str_eq(name, "COUSUB") => "County Subdivisions",
        _ if const_str_eq(name, "TRACT") => "Census Tracts",
        _ if const_str_eq(name, "BG") => "Block Groups",
        _ if const_str_eq(name, "TABBLOCK20") => "Tabulation Blocks (2020)",
        _ if const_str_eq(name, "ZCTA520") => "ZIP Code Tabulation Areas (2020)",
        _ if const_str_eq(name, "COUNTY") => "Counties",
        _ if const_str_eq(name, "STATE") => "States",
        _ if const_str_eq(name, "CD118") => "Congressional Districts (118th)",
        _ if const_str_eq(name, "SLDL") => "State Legislative Districts (Lower)",
        _ if const_str_eq(name, "SLDU") => "State Legislative Districts (Upper)",
        _ if const_str_eq(name, "UNSD") => "Unified School Districts",
        _ if const_str_eq(name, "ELSD") => "Elementary School Districts",
        _ if const_str_eq(name, "SCSD") => "Secondary School Districts",
        _ => "Unknown dataset kind",
    }
}

const fn const_str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// The full fixed enumeration of dataset kinds this catalog knows about.
pub const KINDS: &[Kind] = &[
    Kind("EDGES"),
    Kind("ADDR"),
    Kind("FACES"),
    Kind("FEATNAMES"),
    Kind("PLACE"),
    Kind("COUSUB"),
    Kind("TRACT"),
    Kind("BG"),
    Kind("TABBLOCK20"),
    Kind("ZCTA520"),
    Kind("COUNTY"),
    Kind("STATE"),
    Kind("CD118"),
    Kind("SLDL"),
    Kind("SLDU"),
    Kind("UNSD"),
    Kind("ELSD"),
    Kind("SCSD"),
];

/// Kinds distributed one archive per county.
pub const COUNTY_LEVEL_KINDS: &[Kind] = &[Kind("EDGES"), Kind("ADDR"), Kind("FACES"), Kind("FEATNAMES")];

/// The default kind set the county ETL pipeline consumes.
///
/// Deliberately does not include `FACES`: the ETL (C9) only ever reads an
/// EDGES shapefile plus the FEATNAMES and ADDR attribute tables.
pub const DEGAUSS_KINDS: &[Kind] = &[Kind("EDGES"), Kind("ADDR"), Kind("FEATNAMES")];

/// Looks up a [`Kind`] by its upper- or lower-case name.
///
/// Returns `None` if the name is not one of [`KINDS`].
#[must_use]
pub fn kind_by_name(name: &str) -> Option<Kind> {
    let upper = name.to_uppercase();
    KINDS.iter().copied().find(|k| k.0 == upper)
}

/// Census Bureau TIGER/Line base URL for a given vintage year.
#[must_use]
pub fn base_url(year: u32) -> String {
    format!("https://www2.census.gov/geo/tiger/TIGER{year}")
}

/// Composes the archive download URL for `(year, state_fips, county_fips,
/// kind)`.
///
/// `state_fips` and `county_fips` may be empty for kinds that do not need
/// them (e.g. the national `STATE` kind needs neither).
///
/// # Examples
///
/// ```
/// use tiger_catalog::{compose, kind_by_name};
///
/// let edges = kind_by_name("EDGES").unwrap();
/// assert_eq!(
///     compose(2025, "06", "001", edges),
///     "https://www2.census.gov/geo/tiger/TIGER2025/EDGES/tl_2025_06001_edges.zip"
/// );
///
/// let place = kind_by_name("PLACE").unwrap();
/// assert_eq!(
///     compose(2025, "06", "", place),
///     "https://www2.census.gov/geo/tiger/TIGER2025/PLACE/tl_2025_06_place.zip"
/// );
///
/// let state = kind_by_name("STATE").unwrap();
/// assert_eq!(
///     compose(2025, "", "", state),
///     "https://www2.census.gov/geo/tiger/TIGER2025/STATE/tl_2025_us_state.zip"
/// );
/// ```
#[must_use]
pub fn compose(year: u32, state_fips: &str, county_fips: &str, kind: Kind) -> String {
    let base = base_url(year);
    let dir = kind.name();
    let file_part = kind.file_segment();

    if kind.is_county_level() {
        format!("{base}/{dir}/tl_{year}_{state_fips}{county_fips}_{file_part}.zip")
    } else if kind.name() == "COUNTY" {
        format!("{base}/COUNTY/tl_{year}_{state_fips}_county.zip")
    } else if kind.is_national() {
        format!("{base}/STATE/tl_{year}_us_state.zip")
    } else {
        format!("{base}/{dir}/tl_{year}_{state_fips}_{file_part}.zip")
    }
}

/// Static last-resort county FIPS fallback, used only when the directory
/// scraper (C2) is unavailable or returns no counties for a state.
///
/// Census county FIPS codes are conventionally odd numbers in `001..=199`.
/// The scraper is authoritative where it succeeds; see [`DESIGN.md`] for the
/// rationale.
#[must_use]
pub fn static_county_fips_fallback() -> Vec<String> {
    (1..200).step_by(2).map(|n: u32| format!("{n:03}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_county_level_url() {
        let edges = kind_by_name("edges").unwrap();
        assert_eq!(
            compose(2025, "06", "001", edges),
            "https://www2.census.gov/geo/tiger/TIGER2025/EDGES/tl_2025_06001_edges.zip"
        );
    }

    #[test]
    fn composes_state_summary_url() {
        let place = kind_by_name("PLACE").unwrap();
        assert_eq!(
            compose(2025, "06", "", place),
            "https://www2.census.gov/geo/tiger/TIGER2025/PLACE/tl_2025_06_place.zip"
        );
    }

    #[test]
    fn composes_national_state_url() {
        let state = kind_by_name("STATE").unwrap();
        assert_eq!(
            compose(2025, "", "", state),
            "https://www2.census.gov/geo/tiger/TIGER2025/STATE/tl_2025_us_state.zip"
        );
    }

    #[test]
    fn county_level_kinds_has_four_members() {
        assert_eq!(COUNTY_LEVEL_KINDS.len(), 4);
    }

    #[test]
    fn degauss_kinds_excludes_faces() {
        assert!(!DEGAUSS_KINDS.contains(&kind_by_name("FACES").unwrap()));
    }

    #[test]
    fn static_fallback_is_odd_three_digit_codes() {
        let list = static_county_fips_fallback();
        assert_eq!(list.first().unwrap(), "001");
        assert_eq!(list.last().unwrap(), "199");
        assert_eq!(list.len(), 100);
    }

    #[test]
    fn unknown_kind_name_is_none() {
        assert!(kind_by_name("NOT_A_KIND").is_none());
    }
}
