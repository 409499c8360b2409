//! Best-effort text normalization for dBase character fields.
//!
//! The `dbase` crate decodes `Character` fields using the code page byte
//! declared in the DBF header, defaulting to Windows-1252 when the byte is
//! absent or unrecognized. Some county extracts carry a declared code page
//! that doesn't match the bytes actually on disk, which surfaces here as a
//! string containing the Unicode replacement character. When that happens we
//! re-derive the original bytes (assuming the lossless Latin-1 path the
//! `dbase` crate falls back to) and retry as UTF-8, then Windows-1252,
//! before giving up.

/// Trims `raw` and repairs it if it looks like a failed decode.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains('\u{FFFD}') {
        return trimmed.to_string();
    }

    let bytes: Vec<u8> = trimmed.chars().map(|c| c as u32 as u8).collect();

    let (utf8, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if !had_errors {
        return utf8.trim().to_string();
    }

    let (latin1, _, had_errors) = encoding_rs::WINDOWS_1252.decode(&bytes);
    if !had_errors {
        return latin1.trim().to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_ascii_is_unchanged() {
        assert_eq!(normalize("  Main St  "), "Main St");
    }

    #[test]
    fn replacement_chars_fall_back_to_trimmed_original() {
        let input = "Caf\u{FFFD}";
        assert_eq!(normalize(input), "Caf\u{FFFD}");
    }
}
