use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Known short forms and the spelling shown to the user.
const BRAND_FORMS: [(&str, &str); 8] = [
    ("makemytrip", "MakeMyTrip"),
    ("icici", "ICICI"),
    ("hdfc", "HDFC"),
    ("sbi", "SBI"),
    ("idfc", "IDFC"),
    ("pnb", "PNB"),
    ("rbl", "RBL"),
    ("yes", "YES"),
];

lazy_static! {
    static ref BRAND_PATTERNS: Vec<(Regex, &'static str)> = BRAND_FORMS
        .iter()
        .filter_map(|(word, form)| {
            Regex::new(&format!(r"(?i)\b{}\b", word))
                .ok()
                .map(|re| (re, *form))
        })
        .collect();
}

/// Comparison key: lower case, diacritics stripped, punctuation turned into
/// single spaces, trimmed.
pub fn normalize(s: &str) -> String {
    let spaced: String = s
        .nfkd()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if is_word_char(c) { c } else { ' ' })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Display spelling of bank brands. Does not change the normalized key.
pub fn canonicalize_brand(s: &str) -> String {
    BRAND_PATTERNS
        .iter()
        .fold(s.to_string(), |acc, (re, form)| re.replace_all(&acc, *form).into_owned())
}

/// Ordering for display lists: accent and case insensitive first, raw text as
/// the tie-breaker so the order stays total.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold_for_collation(a)
        .cmp(&fold_for_collation(b))
        .then_with(|| a.cmp(b))
}

fn fold_for_collation(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
