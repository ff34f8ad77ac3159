use std::cmp::Ordering;

use itertools::Itertools;

use crate::catalog::Catalogs;
use crate::matching::{collate, is_fuzzy_match, key_similarity, normalize, score};
use crate::models::{CardIdentity, CardKind};
use crate::opt::*;

pub const MAX_SUGGESTIONS: usize = 50;

const SUBSTRING_BOOST: f64 = 2.0;
const FUZZY_BOOST: f64 = 1.5;
const MIN_BASE_SCORE: f64 = 0.3;

const SELECT_WORD: &str = "select";
const SELECT_PHRASES: [&str; 2] = ["select credit card", "select card"];
const SELECT_SIMILARITY: f64 = 0.7;
const SELECT_MIN_WORD_LEN: usize = 3;

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Suggest);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankerOptions {
    pub limit: usize,
    /// Hand back a pseudo-card built from the typed text when nothing matches.
    pub synthesize_unmatched: bool,
}

impl Default for RankerOptions {
    fn default() -> Self {
        RankerOptions {
            limit: MAX_SUGGESTIONS,
            synthesize_unmatched: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionGroup {
    pub kind: CardKind,
    pub cards: Vec<CardIdentity>,
}

impl SuggestionGroup {
    pub fn label(&self) -> &'static str {
        self.kind.heading()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    NoQuery,
    /// Non-empty query with no catalog entry on either side.
    NoMatch { fallback: Option<CardIdentity> },
    Matches(Vec<SuggestionGroup>),
}

impl Suggestions {
    pub fn cards(&self) -> Vec<&CardIdentity> {
        match self {
            Suggestions::Matches(groups) => groups.iter().flat_map(|g| g.cards.iter()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Suggestions::NoMatch { .. })
    }
}

/// Catalog entries matching `query`, best first, at most `limit` of them.
pub fn suggest(query: &str, catalog: &[CardIdentity], limit: usize) -> Vec<CardIdentity> {
    let q = normalize(query);
    if q.is_empty() {
        return Vec::new();
    }

    catalog
        .iter()
        .filter_map(|card| {
            let base = score(query, &card.display_name);
            let contains = card.normalized_key.contains(&q);
            let fuzzy = is_fuzzy_match(query, &card.display_name);

            if !(contains || fuzzy || base > MIN_BASE_SCORE) {
                return None;
            }

            let mut total = base;
            if contains {
                total += SUBSTRING_BOOST;
            }
            if fuzzy {
                total += FUZZY_BOOST;
            }
            Some((total, card))
        })
        .sorted_by(|(sa, a), (sb, b)| {
            sb.partial_cmp(sa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| (b.normalized_key == q).cmp(&(a.normalized_key == q)))
                .then_with(|| collate(&a.display_name, &b.display_name))
        })
        .take(limit)
        .map(|(_, card)| card.clone())
        .collect()
}

/// Query mentions debit cards: "debit", "debit card(s)", "debitcard" or "dc".
pub fn has_debit_intent(query: &str) -> bool {
    normalize(query).split(' ').any(|word| {
        word == "dc"
            || word
                .strip_prefix("debit")
                .map_or(false, |rest| matches!(rest, "" | "card" | "cards"))
    })
}

/// Query asks for "Select" cards, tolerating typos of the word.
pub fn has_select_intent(query: &str) -> bool {
    let q = normalize(query);
    if SELECT_PHRASES.iter().any(|phrase| q.contains(*phrase)) {
        return true;
    }
    q.split(' ').any(|word| {
        word == SELECT_WORD
            || (word.chars().count() >= SELECT_MIN_WORD_LEN
                && key_similarity(word, SELECT_WORD) >= SELECT_SIMILARITY)
    })
}

fn select_first(cards: Vec<CardIdentity>) -> Vec<CardIdentity> {
    let (select, others): (Vec<_>, Vec<_>) = cards
        .into_iter()
        .partition(|card| card.normalized_key.contains(SELECT_WORD));
    select.into_iter().chain(others).collect()
}

/// Full dropdown for a query against both catalogs, with intent ordering.
pub fn rank(query: &str, catalogs: &Catalogs, options: &RankerOptions) -> Suggestions {
    let trimmed = query.trim();
    if normalize(trimmed).is_empty() {
        return Suggestions::NoQuery;
    }

    let mut credit = suggest(trimmed, catalogs.credit.entries(), options.limit);
    let mut debit = suggest(trimmed, catalogs.debit.entries(), options.limit);
    let debit_first = has_debit_intent(trimmed);

    if credit.is_empty() && debit.is_empty() {
        let fallback = options.synthesize_unmatched.then(|| {
            let kind = if debit_first { CardKind::Debit } else { CardKind::Credit };
            CardIdentity::synthetic(kind, trimmed)
        });
        log(format!("No catalog match for [{}]", trimmed));
        return Suggestions::NoMatch { fallback };
    }

    if has_select_intent(trimmed) {
        credit = select_first(credit);
        debit = select_first(debit);
    }

    let sides = if debit_first {
        [(CardKind::Debit, debit), (CardKind::Credit, credit)]
    } else {
        [(CardKind::Credit, credit), (CardKind::Debit, debit)]
    };

    let groups: Vec<SuggestionGroup> = sides
        .into_iter()
        .filter(|(_, cards)| !cards.is_empty())
        .map(|(kind, cards)| SuggestionGroup { kind, cards })
        .collect();

    log(format!(
        "Query [{}] matched {} card(s), {} first",
        trimmed,
        groups.iter().map(|g| g.cards.len()).sum::<usize>(),
        groups[0].kind,
    ));
    Suggestions::Matches(groups)
}
