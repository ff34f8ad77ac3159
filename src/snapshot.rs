use std::sync::Arc;

use crate::models::{FieldAliases, OfferRecord, RawRow, SiteTag};

#[derive(Debug, Clone, PartialEq)]
pub struct OfferTable {
    pub site: SiteTag,
    pub rows: Vec<RawRow>,
}

impl OfferTable {
    pub fn new(site: SiteTag, rows: Vec<RawRow>) -> Self {
        OfferTable { site, rows }
    }

    pub fn records(&self, aliases: &FieldAliases) -> Vec<OfferRecord> {
        self.rows
            .iter()
            .map(|row| OfferRecord::from_row(self.site, row.clone(), aliases))
            .collect()
    }
}

/// Every table the engine reads from, frozen at one point in time. Tables
/// are only ever replaced whole; an absent or failed source is an empty table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSnapshot {
    reference: Arc<Vec<RawRow>>,
    sources: Vec<Arc<OfferTable>>,
}

impl TableSnapshot {
    pub fn new(reference: Vec<RawRow>, sources: Vec<OfferTable>) -> Self {
        TableSnapshot {
            reference: Arc::new(reference),
            sources: sources.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn reference(&self) -> &[RawRow] {
        &self.reference
    }

    /// Offer sources in rendering priority: the permanent table first, the
    /// others in the order they were given.
    pub fn sources(&self) -> impl Iterator<Item = &OfferTable> {
        let permanent = self.sources.iter().filter(|t| t.site.is_permanent());
        let external = self.sources.iter().filter(|t| !t.site.is_permanent());
        permanent.chain(external).map(|t| t.as_ref())
    }

    pub fn source(&self, site: SiteTag) -> Option<&OfferTable> {
        self.sources.iter().find(|t| t.site == site).map(|t| t.as_ref())
    }

    pub fn with_reference(&self, rows: Vec<RawRow>) -> Self {
        TableSnapshot {
            reference: Arc::new(rows),
            sources: self.sources.clone(),
        }
    }

    /// New snapshot with `table` replacing any table of the same site.
    pub fn with_source(&self, table: OfferTable) -> Self {
        let mut sources: Vec<Arc<OfferTable>> = self
            .sources
            .iter()
            .filter(|t| t.site != table.site)
            .cloned()
            .collect();
        match self.sources.iter().position(|t| t.site == table.site) {
            Some(idx) => sources.insert(idx, Arc::new(table)),
            None => sources.push(Arc::new(table)),
        }
        TableSnapshot {
            reference: self.reference.clone(),
            sources,
        }
    }

    pub fn row_count(&self) -> usize {
        self.reference.len() + self.sources.iter().map(|t| t.rows.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(card: &str) -> RawRow {
        RawRow::from_pairs([("Eligible Credit Cards", card)])
    }

    #[test]
    fn test_sources_put_permanent_first() {
        let snapshot = TableSnapshot::new(
            vec![],
            vec![
                OfferTable::new(SiteTag::Swiggy, vec![]),
                OfferTable::new(SiteTag::Permanent, vec![]),
                OfferTable::new(SiteTag::Zomato, vec![]),
            ],
        );
        let order: Vec<SiteTag> = snapshot.sources().map(|t| t.site).collect();
        assert_eq!(order, vec![SiteTag::Permanent, SiteTag::Swiggy, SiteTag::Zomato]);
    }

    #[test]
    fn test_with_source_replaces_whole_table() {
        let before = TableSnapshot::new(
            vec![row("A")],
            vec![
                OfferTable::new(SiteTag::Swiggy, vec![row("B"), row("C")]),
                OfferTable::new(SiteTag::Zomato, vec![]),
            ],
        );
        let after = before.with_source(OfferTable::new(SiteTag::Swiggy, vec![row("D")]));

        assert_eq!(before.source(SiteTag::Swiggy).map(|t| t.rows.len()), Some(2));
        assert_eq!(after.source(SiteTag::Swiggy).map(|t| t.rows.len()), Some(1));
        let order: Vec<SiteTag> = after.sources().map(|t| t.site).collect();
        assert_eq!(order, vec![SiteTag::Swiggy, SiteTag::Zomato]);
        assert_eq!(after.row_count(), 2);
    }
}
