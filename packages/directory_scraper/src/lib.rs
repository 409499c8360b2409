#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scrapes Census TIGER/Line directory listings (plain Apache-style `<a
//! href>` index pages) for archive URLs, partitioning them by state and
//! deriving county enumerations from filenames.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use tiger_catalog::Kind;

/// Errors that can occur while scraping a directory listing.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The `a[href]` CSS selector failed to parse. This can only happen if
    /// the selector string above is broken, never from response content.
    #[error("Parse error: {0}")]
    Parse(String),
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn filename_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^tl_(\d{4})_(\d{2})(\d{3})?_").expect("static pattern"))
}

/// Scrapes Census directory listing pages, caching results in-process for
/// the lifetime of a run.
pub struct DirectoryScraper {
    client: reqwest::Client,
    cache: Mutex<BTreeMap<String, BTreeSet<String>>>,
}

impl Default for DirectoryScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryScraper {
    /// Creates a scraper with a fresh client and an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// Fetches the directory listing at `url` and returns the set of hrefs
    /// that don't backtrack out of the listing (`../` is filtered).
    ///
    /// Results are cached for the lifetime of this scraper: a second call
    /// with the same `url` returns the cached set without an HTTP request.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the request fails or returns a non-success
    /// status.
    pub async fn scrape(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<BTreeSet<String>, ScrapeError> {
        if let Some(cached) = self.cache.lock().unwrap().get(url) {
            return Ok(cached.clone());
        }

        let body = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let document = Html::parse_document(&body);
        let selector = Selector::parse("a[href]")
            .map_err(|e| ScrapeError::Parse(format!("invalid selector: {e:?}")))?;

        let hrefs: BTreeSet<String> = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(str::to_owned)
            .filter(|href| !href.starts_with("../"))
            .collect();

        self.cache
            .lock()
            .unwrap()
            .insert(url.to_string(), hrefs.clone());
        Ok(hrefs)
    }

    /// Fetches, per requested kind, the directory listing once and
    /// partitions archive names by the state FIPS prefix encoded in the
    /// filename (`tl_{year}_{SSCCC}_…`), keeping only the requested states.
    ///
    /// Never raises: a failed fetch for one kind is logged and contributes
    /// an empty map for that kind, and the remaining kinds still run.
    pub async fn discover(
        &self,
        states: &[String],
        year: u32,
        kinds: &[Kind],
        timeout: Duration,
    ) -> BTreeMap<String, BTreeMap<String, BTreeSet<String>>> {
        let year_str = year.to_string();
        let mut by_kind = BTreeMap::new();

        for kind in kinds {
            let dir_url = format!("{}/{}/", tiger_catalog::base_url(year), kind.name());
            let mut by_state: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

            match self.scrape(&dir_url, timeout).await {
                Ok(hrefs) => {
                    for href in hrefs {
                        let Some(caps) = filename_pattern().captures(&href) else {
                            continue;
                        };
                        if &caps[1] != year_str {
                            continue;
                        }
                        let state_fips = &caps[2];
                        if !states.iter().any(|s| s == state_fips) {
                            continue;
                        }
                        by_state
                            .entry(state_fips.to_string())
                            .or_default()
                            .insert(format!("{dir_url}{href}"));
                    }
                }
                Err(e) => {
                    log::warn!("discover: failed to scrape {dir_url}: {e}");
                }
            }

            by_kind.insert(kind.name().to_string(), by_state);
        }

        by_kind
    }

    /// A thin single-state wrapper around [`Self::discover`].
    pub async fn discover_one(
        &self,
        state_fips: &str,
        year: u32,
        kinds: &[Kind],
        timeout: Duration,
    ) -> BTreeMap<String, BTreeSet<String>> {
        let states = [state_fips.to_string()];
        self.discover(&states, year, kinds, timeout)
            .await
            .into_iter()
            .map(|(kind, by_state)| (kind, by_state.get(state_fips).cloned().unwrap_or_default()))
            .collect()
    }

    /// Derives the sorted, deduplicated list of county FIPS codes present in
    /// `kind`'s directory listing for `state_fips`, by taking the 3-digit
    /// county suffix of the 5-digit `SSCCC` in each matching filename.
    ///
    /// Returns an empty (logged) list if the directory can't be scraped.
    pub async fn enumerate_counties(
        &self,
        state_fips: &str,
        year: u32,
        kind: Kind,
    ) -> Vec<String> {
        let dir_url = format!("{}/{}/", tiger_catalog::base_url(year), kind.name());

        let hrefs = match self.scrape(&dir_url, DEFAULT_TIMEOUT).await {
            Ok(hrefs) => hrefs,
            Err(e) => {
                log::warn!("enumerate_counties: failed to scrape {dir_url}: {e}");
                return Vec::new();
            }
        };

        let year_str = year.to_string();
        let mut counties: BTreeSet<String> = BTreeSet::new();
        for href in hrefs {
            let Some(caps) = filename_pattern().captures(&href) else {
                continue;
            };
            if &caps[1] != year_str || &caps[2] != state_fips {
                continue;
            }
            if let Some(county) = caps.get(3) {
                counties.insert(county.as_str().to_string());
            }
        }

        counties.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_pattern_matches_county_level() {
        let caps = filename_pattern()
            .captures("tl_2023_06037_edges.zip")
            .unwrap();
        assert_eq!(&caps[1], "2023");
        assert_eq!(&caps[2], "06");
        assert_eq!(&caps[3], "037");
    }

    #[test]
    fn filename_pattern_matches_state_summary() {
        let caps = filename_pattern().captures("tl_2023_06_place.zip").unwrap();
        assert_eq!(&caps[1], "2023");
        assert_eq!(&caps[2], "06");
        assert!(caps.get(3).is_none());
    }

    #[test]
    fn filename_pattern_rejects_non_matching() {
        assert!(filename_pattern().captures("readme.txt").is_none());
        assert!(filename_pattern().captures("../").is_none());
    }

    #[tokio::test]
    async fn scrape_returns_cached_entry_without_a_request() {
        let scraper = DirectoryScraper::new();
        scraper.cache.lock().unwrap().insert(
            "https://example/dir/".to_string(),
            ["a.zip", "b.zip"].into_iter().map(String::from).collect(),
        );

        let result = scraper
            .scrape("https://example/dir/", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn enumerate_counties_returns_sorted_unique_codes() {
        let scraper = DirectoryScraper::new();
        let edges = tiger_catalog::kind_by_name("EDGES").unwrap();
        let url = format!("{}/{}/", tiger_catalog::base_url(2023), edges.name());
        scraper.cache.lock().unwrap().insert(
            url,
            [
                "tl_2023_06037_edges.zip",
                "tl_2023_06001_edges.zip",
                "tl_2023_06037_edges.zip",
                "tl_2023_36001_edges.zip",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        let counties = scraper.enumerate_counties("06", 2023, edges).await;
        assert_eq!(counties, vec!["001".to_string(), "037".to_string()]);
    }

    #[tokio::test]
    async fn discover_partitions_by_state_and_skips_unrequested_states() {
        let scraper = DirectoryScraper::new();
        let edges = tiger_catalog::kind_by_name("EDGES").unwrap();
        let url = format!("{}/{}/", tiger_catalog::base_url(2023), edges.name());
        scraper.cache.lock().unwrap().insert(
            url,
            [
                "tl_2023_06037_edges.zip",
                "tl_2023_36001_edges.zip",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        let states = vec!["06".to_string()];
        let result = scraper
            .discover(&states, 2023, &[edges], Duration::from_secs(1))
            .await;

        let by_state = result.get("EDGES").unwrap();
        assert_eq!(by_state.len(), 1);
        assert!(by_state.contains_key("06"));
        assert!(!by_state.contains_key("36"));
    }
}
