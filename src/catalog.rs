use std::collections::HashMap;

use itertools::Itertools;

use crate::matching::{collate, normalize, split_opt};
use crate::models::{display_form, first_present, CardIdentity, CardKind, FieldAliases, RawRow};
use crate::opt::*;
use crate::snapshot::TableSnapshot;

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Catalog);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CardIdentity>,
}

impl Catalog {
    pub fn entries(&self) -> &[CardIdentity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.display_name.as_str()).collect()
    }

    pub fn find(&self, normalized_key: &str) -> Option<&CardIdentity> {
        self.entries.iter().find(|c| c.normalized_key == normalized_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogs {
    pub credit: Catalog,
    pub debit: Catalog,
}

impl Catalogs {
    pub fn of_kind(&self, kind: CardKind) -> &Catalog {
        match kind {
            CardKind::Credit => &self.credit,
            CardKind::Debit => &self.debit,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.credit.is_empty() && self.debit.is_empty()
    }
}

/// Output of one rebuild: the searchable catalogs from the reference table and
/// the "cards with offers" catalogs from the offer tables alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSet {
    pub selectable: Catalogs,
    pub with_offers: Catalogs,
}

/// Per-kind map from normalized key to the first display form seen.
#[derive(Default)]
struct Harvest {
    seen: HashMap<(CardKind, String), String>,
}

impl Harvest {
    fn add_entry(&mut self, kind: CardKind, raw: &str) {
        let display = display_form(raw);
        let key = normalize(&display);
        if key.is_empty() {
            return;
        }
        self.seen.entry((kind, key)).or_insert(display);
    }

    fn add_cell(&mut self, kind: CardKind, cell: Option<&str>) {
        for raw in split_opt(cell) {
            self.add_entry(kind, &raw);
        }
    }

    fn add_rows(&mut self, rows: &[RawRow], aliases: &FieldAliases) {
        for row in rows {
            self.add_cell(CardKind::Credit, first_present(row, &aliases.credit));
            self.add_cell(CardKind::Debit, first_present(row, &aliases.debit));
        }
    }

    fn catalog(&self, kind: CardKind) -> Catalog {
        let entries = self
            .seen
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, display)| display)
            .sorted_by(|a, b| collate(a, b))
            .map(|display| CardIdentity::new(kind, display))
            .collect();
        Catalog { entries }
    }

    fn finish(self) -> Catalogs {
        Catalogs {
            credit: self.catalog(CardKind::Credit),
            debit: self.catalog(CardKind::Debit),
        }
    }
}

/// Rebuilds every catalog from scratch. Holds no state between calls.
pub fn build_catalogs(snapshot: &TableSnapshot, aliases: &FieldAliases) -> CatalogSet {
    let mut selectable = Harvest::default();
    selectable.add_rows(snapshot.reference(), aliases);

    let mut with_offers = Harvest::default();
    for table in snapshot.sources() {
        if table.site.is_permanent() {
            // inbuilt benefits name exactly one credit card per row
            for row in &table.rows {
                if let Some(name) = first_present(row, &aliases.permanent_card) {
                    with_offers.add_entry(CardKind::Credit, name);
                }
            }
        } else {
            with_offers.add_rows(&table.rows, aliases);
        }
    }

    let set = CatalogSet {
        selectable: selectable.finish(),
        with_offers: with_offers.finish(),
    };
    log(format!(
        "Built catalogs: {} credit / {} debit selectable, {} credit / {} debit with offers",
        set.selectable.credit.len(),
        set.selectable.debit.len(),
        set.with_offers.credit.len(),
        set.with_offers.debit.len(),
    ));
    set
}
