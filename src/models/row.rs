use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One parsed table row. Column names are matched case-insensitively; the
/// first header seen wins when two headers differ only by case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut cells = HashMap::new();
        for (key, value) in pairs {
            cells
                .entry(column_key(key.as_ref()))
                .or_insert_with(|| value.into());
        }
        RawRow { cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(&column_key(column)).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }
}

fn column_key(column: &str) -> String {
    column.trim().to_lowercase()
}

pub fn first_present<'a, S: AsRef<str>>(row: &'a RawRow, aliases: &[S]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| row.get(alias.as_ref()))
        .find(|value| !value.trim().is_empty())
}

/// Ordered column aliases for every logical field read from the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub credit: Vec<String>,
    pub debit: Vec<String>,
    pub title: Vec<String>,
    pub website: Vec<String>,
    pub image: Vec<String>,
    pub link: Vec<String>,
    pub description: Vec<String>,
    pub permanent_card: Vec<String>,
    pub permanent_benefit: Vec<String>,
    pub coupon_code: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldAliases {
    fn default() -> Self {
        FieldAliases {
            credit: owned(&["Eligible Credit Cards", "Eligible Cards"]),
            debit: owned(&["Eligible Debit Cards", "Applicable Debit Cards"]),
            title: owned(&["Offer Title", "Title"]),
            website: owned(&["Website"]),
            image: owned(&["Image", "Credit Card Image", "Offer Image", "image", "Image URL"]),
            link: owned(&["Link", "Offer Link"]),
            description: owned(&["Description", "Details", "Offer Description", "Flight Benefit"]),
            permanent_card: owned(&["Eligible Credit Cards"]),
            permanent_benefit: owned(&[
                "Offer",
                "Benefit",
                "Grocery Benefits",
                "Hotel Benefit",
                "Movie Benefit",
            ]),
            coupon_code: owned(&["Coupon Code"]),
        }
    }
}

impl FieldAliases {
    /// Copy of these aliases with `extra` tried before the existing ones for a field.
    pub fn prepend(mut self, field: fn(&mut FieldAliases) -> &mut Vec<String>, extra: &[&str]) -> Self {
        let target = field(&mut self);
        let mut merged = owned(extra);
        merged.extend(target.drain(..).filter(|name| !extra.contains(&name.as_str())));
        *target = merged;
        self
    }
}
