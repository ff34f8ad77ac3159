use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::context::AppConfig;
use crate::models::{RawRow, SiteTag};
use crate::opt::*;
use crate::snapshot::{OfferTable, TableSnapshot};

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Load);
}

/// Sources that could not be read. Each counts as an empty table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub reference_error: Option<String>,
    pub source_errors: Vec<(SiteTag, String)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.reference_error.is_none() && self.source_errors.is_empty()
    }

    pub fn failed_offer_sites(&self) -> Vec<SiteTag> {
        self.source_errors
            .iter()
            .map(|(site, _)| *site)
            .filter(|site| !site.is_permanent())
            .collect()
    }
}

/// Header-keyed rows of a CSV document. Blank rows are skipped.
pub fn parse_table(text: &str) -> Res<Vec<RawRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().err_to_str()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.err_to_str()?;
        let row = RawRow::from_pairs(headers.iter().zip(record.iter()));
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

pub async fn read_table(path: &Path) -> Res<Vec<RawRow>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    parse_table(&text).map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Reference,
    /// Position in `AppConfig::sources`.
    Source(usize),
}

/// Reads every configured table concurrently, then builds one snapshot from
/// the finished reads.
pub async fn load_snapshot(config: &AppConfig) -> (TableSnapshot, LoadReport) {
    let data_dir = config.resolve_data_dir();
    log(format!("Loading tables from {}", data_dir.display()));

    let mut files: Vec<(Slot, PathBuf)> = vec![(Slot::Reference, data_dir.join(&config.reference_file))];
    files.extend(
        config
            .sources
            .iter()
            .enumerate()
            .map(|(idx, source)| (Slot::Source(idx), data_dir.join(&source.file))),
    );

    let mut reads = JoinSet::new();
    for (slot, path) in files {
        reads.spawn(async move {
            let result = read_table(&path).await;
            (slot, result)
        });
    }

    let mut finished: HashMap<Slot, Res<Vec<RawRow>>> = HashMap::new();
    while let Some(joined) = reads.join_next().await {
        match joined {
            Ok((slot, result)) => {
                finished.insert(slot, result);
            }
            Err(err) => log(format!("Table read task failed: {}", err)),
        }
    }

    assemble(config, finished)
}

/// Builds the snapshot from finished reads. A slot with no result counts as
/// a failed read.
fn assemble(config: &AppConfig, mut finished: HashMap<Slot, Res<Vec<RawRow>>>) -> (TableSnapshot, LoadReport) {
    let mut report = LoadReport::default();
    let mut take = |slot: Slot, name: &str| -> Vec<RawRow> {
        let result = finished
            .remove(&slot)
            .unwrap_or_else(|| Err(format!("Read of {} did not finish", name)));
        match result {
            Ok(rows) => {
                log(format!("Loaded {} row(s) for {}", rows.len(), name));
                rows
            }
            Err(err) => {
                log(err.clone());
                match slot {
                    Slot::Reference => report.reference_error = Some(err),
                    Slot::Source(idx) => report.source_errors.push((config.sources[idx].site, err)),
                }
                Vec::new()
            }
        }
    };

    let reference = take(Slot::Reference, &config.reference_file);
    let sources = config
        .sources
        .iter()
        .enumerate()
        .map(|(idx, source)| OfferTable::new(source.site, take(Slot::Source(idx), &source.file)))
        .collect();

    (TableSnapshot::new(reference, sources), report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::SourceConfig;

    #[test]
    fn test_parse_table() {
        let text = "\u{feff}Eligible Credit Cards,Offer Title\n\"HDFC Regalia (Visa),\nSBI Card\",Flat 20%\n,\nAxis Ace\n";
        let rows = parse_table(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("eligible credit cards"), Some("HDFC Regalia (Visa),\nSBI Card"));
        assert_eq!(rows[0].get("Offer Title"), Some("Flat 20%"));
        assert_eq!(rows[1].get("Eligible Credit Cards"), Some("Axis Ace"));
        assert_eq!(rows[1].get("Offer Title"), None);
    }

    #[test]
    fn test_unfinished_reads_are_reported() {
        let config = AppConfig::default();
        let mut finished = HashMap::new();
        finished.insert(Slot::Source(1), parse_table("Eligible Credit Cards\nAxis Ace\n"));

        let (snapshot, report) = assemble(&config, finished);
        assert_eq!(snapshot.source(SiteTag::Swiggy).map(|t| t.rows.len()), Some(1));
        assert_eq!(snapshot.source(SiteTag::Zomato).map(|t| t.rows.len()), Some(0));
        assert!(report.reference_error.is_some());
        let failed: Vec<SiteTag> = report.source_errors.iter().map(|(site, _)| *site).collect();
        assert_eq!(failed, vec![SiteTag::Permanent, SiteTag::Zomato, SiteTag::EazyDiner]);
        assert_eq!(report.failed_offer_sites(), vec![SiteTag::Zomato, SiteTag::EazyDiner]);
    }

    #[tokio::test]
    async fn test_load_snapshot_with_missing_source() {
        let dir = tempfile::tempdir().expect("Failed to create a temp dir");
        std::fs::write(dir.path().join("cards.csv"), "Eligible Credit Cards\nHDFC Regalia\n").unwrap();
        std::fs::write(
            dir.path().join("swiggy.csv"),
            "Eligible Credit Cards,Offer\nHDFC Regalia (Visa),20% off\n",
        )
        .unwrap();

        let config = AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            reference_file: "cards.csv".to_string(),
            sources: vec![
                SourceConfig {
                    site: SiteTag::Swiggy,
                    file: "swiggy.csv".to_string(),
                    variant_note: true,
                    fallback_image: None,
                },
                SourceConfig {
                    site: SiteTag::Zomato,
                    file: "missing.csv".to_string(),
                    variant_note: true,
                    fallback_image: None,
                },
            ],
            ..AppConfig::default()
        };

        let (snapshot, report) = load_snapshot(&config).await;
        assert_eq!(snapshot.reference().len(), 1);
        assert_eq!(snapshot.source(SiteTag::Swiggy).map(|t| t.rows.len()), Some(1));
        assert_eq!(snapshot.source(SiteTag::Zomato).map(|t| t.rows.len()), Some(0));
        assert!(!report.is_clean());
        assert_eq!(report.failed_offer_sites(), vec![SiteTag::Zomato]);
    }
}
