//! Page-title ordering for the final reference mapping.
//!
//! Titles that are numeric, or start with a run of digits, come first in
//! ascending numeric order; every other title follows. Ties fall back to the
//! full title string. Text titles carry both the "non-numeric" flag and the
//! infinity sentinel.

use crate::output::MediaReferences;
use once_cell::sync::Lazy;
use regex::Regex;

// `\d` is Unicode-aware: any decimal digit (category Nd) counts.
static RE_LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").unwrap());
static RE_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d$").unwrap());

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0; 4];
    RE_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Value of a decimal digit from any script.
///
/// Unicode encodes decimal digits in contiguous runs ascending from zero,
/// so the offset from the start of the run, modulo ten, is the value.
fn digit_value(c: char) -> u32 {
    if let Some(d) = c.to_digit(10) {
        return d;
    }
    let mut offset = 0;
    let mut cp = c as u32;
    while let Some(prev) = cp.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        offset += 1;
        cp -= 1;
    }
    offset % 10
}

/// Leading integer of a page title, or +infinity when there is none.
///
/// Finite values are stored as their decimal digits without leading zeros,
/// so arbitrarily long page numbers compare exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LeadingNumber {
    Finite { width: usize, digits: String },
    Infinity,
}

impl LeadingNumber {
    fn from_digits(digits: &str) -> Self {
        let ascii: String = digits
            .chars()
            .filter_map(|c| char::from_digit(digit_value(c), 10))
            .collect();
        let trimmed = ascii.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        LeadingNumber::Finite {
            width: digits.len(),
            digits: digits.to_string(),
        }
    }
}

/// Sort key derived from a page title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub non_numeric: bool,
    pub leading: LeadingNumber,
    pub title: String,
}

impl SortKey {
    pub fn for_title(title: &str) -> Self {
        let leading = leading_number(title);
        Self {
            non_numeric: !is_numeric_title(title),
            leading,
            title: title.to_string(),
        }
    }
}

/// `true` when the trimmed title is all digits or starts with a digit run.
pub fn is_numeric_title(title: &str) -> bool {
    RE_LEADING_DIGITS.is_match(title.trim())
}

/// The leading integer of the trimmed title.
pub fn leading_number(title: &str) -> LeadingNumber {
    match RE_LEADING_DIGITS.find(title.trim()) {
        Some(m) => LeadingNumber::from_digits(m.as_str()),
        None => LeadingNumber::Infinity,
    }
}

/// Re-order references by the page-title key; equal keys keep their order.
pub fn sort_references(refs: MediaReferences) -> MediaReferences {
    let mut entries: Vec<_> = refs.into_iter().collect();
    entries.sort_by_cached_key(|(_, r)| SortKey::for_title(&r.page_title));
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{MediaReference, MediaType};

    fn reference(src: &str, page_title: &str) -> MediaReference {
        MediaReference {
            source: src.into(),
            media_type: MediaType::Image,
            title: "t".into(),
            xml_file: "p.xml".into(),
            page_id: None,
            page_title: page_title.into(),
        }
    }

    fn sorted_titles(titles: &[&str]) -> Vec<String> {
        let mut refs = MediaReferences::new();
        for (i, t) in titles.iter().enumerate() {
            refs.insert(format!("{i}.png"), reference(&format!("{i}.png"), t));
        }
        sort_references(refs)
            .into_values()
            .map(|r| r.page_title)
            .collect()
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric_title("100"));
        assert!(is_numeric_title("  42 "));
        assert!(is_numeric_title("3 Methods"));
        assert!(!is_numeric_title("Intro"));
        assert!(!is_numeric_title("Chapter 1"));
        assert!(!is_numeric_title(""));
    }

    #[test]
    fn numbers_compare_by_value_not_text() {
        assert_eq!(sorted_titles(&["100", "25"]), vec!["25", "100"]);
    }

    #[test]
    fn numeric_titles_precede_text_titles() {
        assert_eq!(
            sorted_titles(&["Appendix", "999 Notes", "Intro", "2"]),
            vec!["2", "999 Notes", "Appendix", "Intro"]
        );
    }

    #[test]
    fn equal_numbers_tie_break_on_full_title() {
        assert_eq!(
            sorted_titles(&["10 b", "10 a", "010"]),
            vec!["010", "10 a", "10 b"]
        );
    }

    #[test]
    fn very_long_numbers_compare_exactly() {
        assert_eq!(
            sorted_titles(&["123456789012345678901234567890", "99999999999999999999"]),
            vec!["99999999999999999999", "123456789012345678901234567890"]
        );
    }

    #[test]
    fn leading_zeros_are_ignored_for_value() {
        assert_eq!(leading_number("007"), leading_number("7"));
        assert_eq!(
            leading_number("000"),
            LeadingNumber::Finite {
                width: 1,
                digits: "0".into()
            }
        );
        assert_eq!(leading_number("Intro"), LeadingNumber::Infinity);
    }

    #[test]
    fn non_ascii_decimal_digits_have_numeric_value() {
        // Arabic-Indic three, fullwidth one-two, mathematical bold seven
        assert_eq!(leading_number("\u{663}"), leading_number("3"));
        assert_eq!(leading_number("\u{ff11}\u{ff12} Notes"), leading_number("12"));
        assert_eq!(leading_number("\u{1d7d5}"), leading_number("7"));
        assert!(is_numeric_title("\u{663} Intro"));
        assert_eq!(
            sorted_titles(&["Intro", "10", "\u{663} Intro"]),
            vec!["\u{663} Intro", "10", "Intro"]
        );
    }

    #[test]
    fn identical_titles_keep_insertion_order() {
        let mut refs = MediaReferences::new();
        refs.insert("b.png".into(), reference("b.png", "Same"));
        refs.insert("a.png".into(), reference("a.png", "Same"));
        let keys: Vec<_> = sort_references(refs).into_keys().collect();
        assert_eq!(keys, vec!["b.png", "a.png"]);
    }
}
