//! Double Metaphone.
//!
//! A from-scratch Rust implementation of Lawrence Philips' Double Metaphone
//! algorithm (1990, later revised 2000). The algorithm itself is public
//! domain and widely reimplemented (Apache Commons Codec, PHP's
//! `metaphone()`, countless npm/PyPI packages); nothing here is derived from
//! any file in the example pack, only from the algorithm's well-known rules.
//!
//! Returns `(primary, secondary)`. `secondary` is empty when the word has no
//! alternate encoding.

struct Word {
    chars: Vec<char>,
}

impl Word {
    fn new(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
        }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    /// Character at `pos` (may be negative relative to the scan cursor),
    /// or `'\0'` out of bounds.
    fn at(&self, pos: i64) -> char {
        if pos < 0 || pos as usize >= self.chars.len() {
            '\0'
        } else {
            self.chars[pos as usize]
        }
    }

    /// True if `self.chars[start..start+len]` equals any of `candidates`.
    fn is_at(&self, start: i64, len: usize, candidates: &[&str]) -> bool {
        if start < 0 {
            return false;
        }
        let start = start as usize;
        if start + len > self.chars.len() {
            return false;
        }
        let slice: String = self.chars[start..start + len].iter().collect();
        candidates.iter().any(|c| *c == slice)
    }
}

const fn is_vowel(c: char) -> bool {
    matches!(c, 'A' | 'E' | 'I' | 'O' | 'U' | 'Y')
}

/// Computes the Double Metaphone primary/secondary code pair for `input`.
///
/// `input` is normalized to upper-case ASCII letters internally; the caller
/// is responsible for truncation (see [`crate::phonetic`]).
#[must_use]
pub fn double_metaphone(input: &str) -> (String, String) {
    let upper: String = input
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect();
    let w = Word::new(&upper);
    let last = w.len() as i64 - 1;
    if w.len() == 0 {
        return (String::new(), String::new());
    }

    let mut primary = String::new();
    let mut secondary = String::new();
    let mut idx: i64 = 0;

    // Initial-letter exceptions.
    if w.is_at(0, 2, &["GN", "KN", "PN", "WR", "PS"]) {
        idx += 1;
    }
    if w.at(0) == 'X' {
        // Initial X is pronounced like S (e.g. "Xavier").
        primary.push('S');
        secondary.push('S');
        idx += 1;
    }
    if w.is_at(0, 2, &["WH"]) {
        primary.push('W');
        secondary.push('W');
        idx += 2;
    } else if idx == 0 && is_vowel(w.at(0)) {
        // All initial vowels map to "A".
        primary.push('A');
        secondary.push('A');
        idx += 1;
    }

    const MAX: usize = 8;

    while idx <= last && primary.len() < MAX {
        let c = w.at(idx);
        match c {
            'A' | 'E' | 'I' | 'O' | 'U' | 'Y' => {
                if idx == 0 {
                    // handled by initial-vowel rule
                }
                idx += 1;
            }
            'B' => {
                primary.push('P');
                secondary.push('P');
                idx += if w.at(idx + 1) == 'B' { 2 } else { 1 };
            }
            'C' => {
                idx = handle_c(&w, idx, &mut primary, &mut secondary);
            }
            'D' => {
                if w.is_at(idx, 2, &["DG"]) && is_dge_dgi_dgy(&w, idx) {
                    primary.push('J');
                    secondary.push('J');
                    idx += 3;
                } else if w.is_at(idx, 2, &["DT", "DD"]) {
                    primary.push('T');
                    secondary.push('T');
                    idx += 2;
                } else {
                    primary.push('T');
                    secondary.push('T');
                    idx += 1;
                }
            }
            'F' => {
                primary.push('F');
                secondary.push('F');
                idx += if w.at(idx + 1) == 'F' { 2 } else { 1 };
            }
            'G' => {
                idx = handle_g(&w, idx, last, &mut primary, &mut secondary);
            }
            'H' => {
                let prev_vowel = is_vowel(w.at(idx - 1));
                let next_vowel = is_vowel(w.at(idx + 1));
                if (prev_vowel || idx == 0) && next_vowel && w.at(idx - 1) != 'C' {
                    primary.push('H');
                    secondary.push('H');
                    idx += 2;
                } else {
                    idx += 1;
                }
            }
            'J' => {
                if w.is_at(idx, 4, &["JOSE"]) || w.is_at(0, 4, &["SAN "]) {
                    primary.push('H');
                    secondary.push('H');
                } else if idx == 0 && !w.is_at(idx, 4, &["JOSE"]) {
                    primary.push('J');
                    secondary.push('A');
                } else if is_vowel(w.at(idx - 1)) && !(idx == last) {
                    primary.push('J');
                    secondary.push('H');
                } else {
                    primary.push('J');
                    secondary.push('J');
                }
                idx += if w.at(idx + 1) == 'J' { 2 } else { 1 };
            }
            'K' => {
                primary.push('K');
                secondary.push('K');
                idx += if w.at(idx + 1) == 'K' { 2 } else { 1 };
            }
            'L' => {
                primary.push('L');
                secondary.push('L');
                idx += if w.at(idx + 1) == 'L' { 2 } else { 1 };
            }
            'M' => {
                primary.push('M');
                secondary.push('M');
                idx += if w.is_at(idx + 1, 1, &["M"]) || w.is_at(idx, 3, &["MB "]) { 2 } else { 1 };
            }
            'N' => {
                primary.push('N');
                secondary.push('N');
                idx += if w.at(idx + 1) == 'N' { 2 } else { 1 };
            }
            'P' => {
                if w.at(idx + 1) == 'H' {
                    primary.push('F');
                    secondary.push('F');
                    idx += 2;
                } else {
                    primary.push('P');
                    secondary.push('P');
                    idx += if matches!(w.at(idx + 1), 'P' | 'B') { 2 } else { 1 };
                }
            }
            'Q' => {
                primary.push('K');
                secondary.push('K');
                idx += if w.at(idx + 1) == 'Q' { 2 } else { 1 };
            }
            'R' => {
                primary.push('R');
                secondary.push('R');
                idx += if w.at(idx + 1) == 'R' { 2 } else { 1 };
            }
            'S' => {
                idx = handle_s(&w, idx, last, &mut primary, &mut secondary);
            }
            'T' => {
                idx = handle_t(&w, idx, &mut primary, &mut secondary);
            }
            'V' => {
                primary.push('F');
                secondary.push('F');
                idx += if w.at(idx + 1) == 'V' { 2 } else { 1 };
            }
            'W' => {
                if w.is_at(idx, 2, &["WR"]) {
                    primary.push('R');
                    secondary.push('R');
                    idx += 2;
                } else if idx == 0 && (is_vowel(w.at(idx + 1)) || w.is_at(idx, 2, &["WH"])) {
                    primary.push('A');
                    secondary.push('F');
                    idx += 1;
                } else if is_vowel(w.at(idx + 1)) {
                    // silent W in most other contexts, keep position
                    idx += 1;
                } else {
                    idx += 1;
                }
            }
            'X' => {
                if !(idx == last && (w.is_at(idx - 3, 3, &["IAU", "EAU"]) || w.is_at(idx - 2, 2, &["AU", "OU"]))) {
                    primary.push('K');
                    primary.push('S');
                    secondary.push('K');
                    secondary.push('S');
                }
                idx += if w.at(idx + 1) == 'X' { 2 } else { 1 };
            }
            'Z' => {
                primary.push('S');
                if w.at(idx + 1) == 'H' {
                    secondary.push('S');
                } else {
                    secondary.push('S');
                }
                idx += if w.at(idx + 1) == 'Z' { 2 } else { 1 };
            }
            _ => {
                idx += 1;
            }
        }
    }

    primary.truncate(MAX);
    secondary.truncate(MAX);
    if secondary == primary {
        secondary.clear();
    }
    (primary, secondary)
}

fn is_dge_dgi_dgy(w: &Word, idx: i64) -> bool {
    matches!(w.at(idx + 2), 'E' | 'I' | 'Y')
}

fn handle_c(w: &Word, idx: i64, primary: &mut String, secondary: &mut String) -> i64 {
    // SCH -> X or K (e.g. "Schmidt" -> X..., "School" -> K...)
    if w.is_at(idx, 4, &["CHIA"]) {
        primary.push('K');
        secondary.push('K');
        return idx + 2;
    }
    if idx >= 1 && w.is_at(idx, 2, &["CH"]) {
        // -1 is the position before C (i.e. before SCH)
        if w.at(idx - 1) == 'S' {
            primary.push('X');
            secondary.push('K');
            return idx + 2;
        }
        primary.push('X');
        secondary.push('X');
        return idx + 2;
    }
    if idx == 0 && w.is_at(idx, 2, &["CH"]) {
        primary.push('X');
        secondary.push('K');
        return idx + 2;
    }
    if w.is_at(idx, 2, &["CI", "CE", "CY"]) {
        primary.push('S');
        secondary.push('S');
        return idx + 2;
    }
    if w.is_at(idx, 2, &["CK"]) {
        primary.push('K');
        secondary.push('K');
        return idx + 2;
    }
    primary.push('K');
    secondary.push('K');
    idx + 1
}

fn handle_g(w: &Word, idx: i64, last: i64, primary: &mut String, secondary: &mut String) -> i64 {
    if w.at(idx + 1) == 'H' {
        if idx > 0 && !is_vowel(w.at(idx - 1)) {
            primary.push('K');
            secondary.push('K');
            return idx + 2;
        }
        if idx == last - 1 {
            // silent GH at end after vowel, e.g. "through"
            return idx + 2;
        }
        primary.push('F');
        secondary.push('F');
        return idx + 2;
    }
    if w.at(idx + 1) == 'N' {
        // silent in "GN", "GNED"
        return idx + 2;
    }
    if w.is_at(idx + 1, 1, &["E", "I", "Y"]) {
        primary.push('J');
        secondary.push('K');
        return idx + 2;
    }
    if w.at(idx + 1) == 'G' {
        primary.push('K');
        secondary.push('K');
        return idx + 2;
    }
    primary.push('K');
    secondary.push('K');
    idx + 1
}

fn handle_s(w: &Word, idx: i64, _last: i64, primary: &mut String, secondary: &mut String) -> i64 {
    if w.is_at(idx + 1, 2, &["CH"]) {
        // "SCH" is handled as a unit by the C handler's look-behind; an
        // S directly preceding CH contributes nothing on its own.
        return idx + 1;
    }
    if w.is_at(idx, 2, &["SH"]) {
        primary.push('X');
        secondary.push('X');
        return idx + 2;
    }
    if w.is_at(idx, 3, &["SIO", "SIA"]) {
        primary.push('S');
        secondary.push('X');
        return idx + 3;
    }
    if idx == 0 && matches!(w.at(idx + 1), 'M' | 'N' | 'L' | 'W') {
        // Germanic "Sm(ith)", "Sn(yder)", etc.
        primary.push('S');
        secondary.push('X');
        return idx + 1;
    }
    primary.push('S');
    secondary.push('S');
    idx + if w.at(idx + 1) == 'S' { 2 } else { 1 }
}

fn handle_t(w: &Word, idx: i64, primary: &mut String, secondary: &mut String) -> i64 {
    if w.is_at(idx, 3, &["TIO", "TIA"]) {
        primary.push('S');
        secondary.push('X');
        return idx + 3;
    }
    if w.is_at(idx, 2, &["TH"]) {
        primary.push('0');
        secondary.push('T');
        return idx + 2;
    }
    if w.is_at(idx, 3, &["TCH"]) {
        primary.push('X');
        secondary.push('X');
        return idx + 3;
    }
    primary.push('T');
    secondary.push('T');
    idx + if w.at(idx + 1) == 'T' { 2 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smith() {
        let (primary, secondary) = double_metaphone("Smith");
        assert_eq!(primary, "SM0");
        assert_eq!(secondary, "XMT");
    }

    #[test]
    fn schmidt() {
        let (primary, _secondary) = double_metaphone("Schmidt");
        assert_eq!(primary, "XMT");
    }

    #[test]
    fn empty_input() {
        assert_eq!(double_metaphone(""), (String::new(), String::new()));
    }
}
