#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the state store (`file_record`, `url_list`,
//! `state_counters`, `discovered_urls`, `config`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a single downloaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Fully downloaded and renamed into place.
    Completed,
    /// Exhausted its retry budget without completing.
    Failed,
    /// A `.tmp` file exists holding a resumable prefix.
    Partial,
}

impl FileStatus {
    /// Returns the `snake_case` string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Partial => "partial",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FileStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "partial" => Ok(Self::Partial),
            _ => Err(format!("unknown FileStatus: {value}")),
        }
    }
}

impl std::str::FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Which of the two mutually-exclusive URL lists a URL currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    /// The URL's file downloaded successfully.
    Completed,
    /// The URL's file failed after exhausting retries.
    Failed,
}

impl ListType {
    /// Returns the `snake_case` string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ListType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown ListType: {value}")),
        }
    }
}

impl std::str::FromStr for ListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// A single tracked download outcome, keyed by destination path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub url: String,
    pub status: FileStatus,
    pub state_fips: String,
    pub size: Option<i64>,
    pub bytes_downloaded: Option<i64>,
    pub error: Option<String>,
    pub timestamp: String,
}

/// A URL's membership in the completed/failed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlListEntry {
    pub url: String,
    pub list_type: ListType,
    pub added_at: String,
}

/// Running per-state counters, refreshed by the fetcher and the scraper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCounters {
    pub state_fips: String,
    pub name: String,
    pub completed: i64,
    pub failed: i64,
    pub discovered: i64,
    pub last_updated: String,
}

/// A URL surfaced by the directory scraper for a given state, in a given run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredUrl {
    pub state_fips: String,
    pub url: String,
    pub discovered_at: String,
}

/// The single saved run configuration, used to resume a run whose flags were
/// omitted on a later invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub year: u32,
    pub states: Vec<String>,
    pub kinds: Vec<String>,
}

/// A snapshot of how many of a state's discovered URLs have completed,
/// failed, or remain pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub discovered: i64,
    pub completed: i64,
    pub failed: i64,
    pub pending: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_status_round_trips() {
        for s in [FileStatus::Completed, FileStatus::Failed, FileStatus::Partial] {
            assert_eq!(s.as_str().parse::<FileStatus>().unwrap(), s);
        }
    }

    #[test]
    fn list_type_round_trips() {
        for s in [ListType::Completed, ListType::Failed] {
            assert_eq!(s.as_str().parse::<ListType>().unwrap(), s);
        }
    }

    #[test]
    fn unknown_file_status_errs() {
        assert!("bogus".parse::<FileStatus>().is_err());
    }
}
