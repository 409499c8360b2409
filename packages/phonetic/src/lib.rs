#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bounded-length phonetic coding for street and city names.
//!
//! [`phonetic`] is the single entry point the ETL and schema manager use to
//! compute `street_phone`/`city_phone` columns. It prefers a Double
//! Metaphone primary code, falls back to the secondary code, and finally
//! falls back to classic Metaphone, matching the degauss lineage this
//! system's schema was modeled on.

mod classic;
mod dm;

/// Computes a deterministic, upper-case phonetic code for `name`, truncated
/// to `max_len` characters.
///
/// Empty, all-whitespace, or absent input returns an empty string.
///
/// # Examples
///
/// ```
/// use tiger_phonetic::phonetic;
///
/// assert_eq!(phonetic("Smith", 5), "SM0");
/// assert_eq!(phonetic("Schmidt", 3), "XMT");
/// assert_eq!(phonetic("", 5), "");
/// ```
#[must_use]
pub fn phonetic(name: &str, max_len: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let (primary, secondary) = dm::double_metaphone(trimmed);
    let mut code = if !primary.is_empty() {
        primary
    } else if !secondary.is_empty() {
        secondary
    } else {
        classic::metaphone(trimmed)
    };

    code.truncate(max_len);
    code.to_uppercase()
}

/// Convenience overload for optional input (`city`/`street` columns may be
/// absent in upstream data).
#[must_use]
pub fn phonetic_opt(name: Option<&str>, max_len: usize) -> String {
    name.map_or_else(String::new, |n| phonetic(n, max_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smith_primary() {
        assert_eq!(phonetic("Smith", 5), "SM0");
    }

    #[test]
    fn schmidt_truncated() {
        assert_eq!(phonetic("Schmidt", 3), "XMT");
    }

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(phonetic("", 5), "");
        assert_eq!(phonetic("   ", 5), "");
    }

    #[test]
    fn none_input() {
        assert_eq!(phonetic_opt(None, 5), "");
    }

    #[test]
    fn truncates_to_max_len() {
        let code = phonetic("Washington", 3);
        assert!(code.len() <= 3);
    }

    #[test]
    fn deterministic() {
        assert_eq!(phonetic("Main Street", 5), phonetic("Main Street", 5));
    }
}
