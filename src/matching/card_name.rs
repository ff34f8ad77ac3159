use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TRAILING_GROUP: Regex = Regex::new(r"\s*\([^)]*\)\s*$").unwrap();
    static ref TRAILING_VARIANT: Regex = Regex::new(r"\(([^)]+)\)\s*$").unwrap();
}

/// Card name without its trailing "(...)" network/variant suffix.
pub fn base_name(raw: &str) -> String {
    TRAILING_GROUP.replace(raw, "").trim().to_string()
}

pub fn variant(raw: &str) -> String {
    TRAILING_VARIANT
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Entries of a comma separated card cell. Newlines count as spaces.
pub fn split_list(cell: &str) -> Vec<String> {
    cell.replace(['\r', '\n'], " ")
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn split_opt(cell: Option<&str>) -> Vec<String> {
    cell.map(split_list).unwrap_or_default()
}
