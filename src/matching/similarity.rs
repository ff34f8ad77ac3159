use strsim::levenshtein;

use super::normalizer::normalize;

/// Score returned when the candidate contains the query outright.
pub const SUBSTRING_SCORE: f64 = 100.0;

const WORD_OVERLAP_WEIGHT: f64 = 0.7;
const WHOLE_STRING_WEIGHT: f64 = 0.3;

const FUZZY_WHOLE_THRESHOLD: f64 = 0.6;
const FUZZY_WORD_THRESHOLD: f64 = 0.7;
const FUZZY_MIN_WORD_LEN: usize = 3;

pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(&normalize(a), &normalize(b))
}

/// `1 - distance / longest length` over strings that are already normalized.
pub fn key_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Ranking score of `candidate` for `query`. Containment short-circuits to
/// [`SUBSTRING_SCORE`]; otherwise a blend of word overlap and whole-string
/// similarity in `[0, 1]`.
pub fn score(query: &str, candidate: &str) -> f64 {
    let q = normalize(query);
    let c = normalize(candidate);
    if q.is_empty() {
        return 0.0;
    }
    if c.contains(&q) {
        return SUBSTRING_SCORE;
    }

    let q_words: Vec<&str> = q.split(' ').collect();
    let c_words: Vec<&str> = c.split(' ').filter(|w| !w.is_empty()).collect();

    let matching = q_words
        .iter()
        .filter(|qw| c_words.iter().any(|cw| cw.contains(**qw)))
        .count();
    let overlap = matching as f64 / q_words.len().max(1) as f64;

    overlap * WORD_OVERLAP_WEIGHT + key_similarity(&q, &c) * WHOLE_STRING_WEIGHT
}

/// Looser than [`score`]: also accepts a single badly misspelled word.
pub fn is_fuzzy_match(query: &str, label: &str) -> bool {
    let q = normalize(query);
    let l = normalize(label);
    if q.is_empty() || l.is_empty() {
        return false;
    }
    if l.contains(&q) || key_similarity(&q, &l) >= FUZZY_WHOLE_THRESHOLD {
        return true;
    }

    let long_words = |s: &str| -> Vec<String> {
        s.split(' ')
            .filter(|w| w.chars().count() >= FUZZY_MIN_WORD_LEN)
            .map(str::to_string)
            .collect()
    };
    let label_words = long_words(&l);

    long_words(&q).iter().any(|qw| {
        label_words
            .iter()
            .any(|lw| key_similarity(qw, lw) >= FUZZY_WORD_THRESHOLD)
    })
}
