//! Field-level parsing helpers shared by the `linezip`/`features`/`ranges`
//! builders: pulling a trailing run of digits (a house number) and a
//! leading run of non-digits (a prefix like `"N"` in `"N123"`) out of an
//! ADDR `fromhn`/`tohn` string.

/// The trailing run of ASCII digits in `s`, parsed as an `i64`.
///
/// Returns 0 if `s` has no trailing digits (including when `s` is empty).
#[must_use]
pub fn trailing_digits(s: &str) -> i64 {
    let digits: String = s
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().unwrap_or(0)
}

/// The leading run of non-digit characters in `s`, trimmed.
///
/// Returns `""` if `s` starts with a digit (including when `s` is empty).
#[must_use]
pub fn leading_nondigits(s: &str) -> String {
    s.chars()
        .take_while(|c| !c.is_ascii_digit())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_digits_extracts_house_number() {
        assert_eq!(trailing_digits("A123B45"), 45);
        assert_eq!(trailing_digits("123"), 123);
    }

    #[test]
    fn trailing_digits_is_zero_for_no_digits_or_empty() {
        assert_eq!(trailing_digits("ABC"), 0);
        assert_eq!(trailing_digits(""), 0);
    }

    #[test]
    fn leading_nondigits_extracts_prefix() {
        assert_eq!(leading_nondigits("A123B45"), "A");
        assert_eq!(leading_nondigits("N 123"), "N");
    }

    #[test]
    fn leading_nondigits_is_empty_for_leading_digit_or_empty() {
        assert_eq!(leading_nondigits("123"), "");
        assert_eq!(leading_nondigits(""), "");
    }
}
