use crate::catalog::{build_catalogs, CatalogSet};
use crate::context::AppConfig;
use crate::models::*;
use crate::offers::{build_view, dedup, group_by_site, match_offers};
use crate::opt::*;
use crate::snapshot::TableSnapshot;
use crate::suggest::{rank, Suggestions};

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Offers);
}

/// Read-only view over one table snapshot with its catalogs already built.
/// A new snapshot means a new `Lookup`; nothing here is patched in place.
#[derive(Debug, Clone)]
pub struct Lookup {
    config: AppConfig,
    snapshot: TableSnapshot,
    catalogs: CatalogSet,
}

impl Lookup {
    pub fn new(snapshot: TableSnapshot, config: AppConfig) -> Self {
        let catalogs = build_catalogs(&snapshot, &config.aliases);
        Lookup {
            config,
            snapshot,
            catalogs,
        }
    }

    pub fn catalogs(&self) -> &CatalogSet {
        &self.catalogs
    }

    pub fn snapshot(&self) -> &TableSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn suggest(&self, query: &str) -> Suggestions {
        rank(query, &self.catalogs.selectable, &self.config.ranker_options())
    }

    /// Card picked from the "cards with offers" strip. Taken as-is, no ranking.
    pub fn select_chip(&self, name: &str, kind: CardKind) -> CardIdentity {
        CardIdentity::from_entry(kind, name)
    }

    pub fn matched_offers(&self, card: &CardIdentity) -> Vec<MatchedOffer> {
        self.snapshot
            .sources()
            .flat_map(|table| match_offers(card, &table.records(&self.config.aliases)))
            .collect()
    }

    /// Deduplicated offers for `card`, grouped by site. Empty means "no offers".
    pub fn offers_for(&self, card: &CardIdentity) -> Vec<OfferGroup> {
        let matched = self.matched_offers(card);
        let total = matched.len();
        let kept = dedup(matched, &self.config.aliases);

        log(format!(
            "{}: {} matched offer(s), {} after dedup",
            card,
            total,
            kept.len()
        ));

        group_by_site(&kept, |m| {
            build_view(m, &self.config.aliases, &self.config.style(m.site))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::snapshot::OfferTable;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::from_pairs(pairs.iter().copied())
    }

    fn sample() -> Lookup {
        let reference = vec![
            row(&[("Eligible Credit Cards", "HDFC Regalia (Visa), HDFC Regalia (Mastercard), SBI Card")]),
            row(&[("Eligible Debit Cards", "SBI Card (RuPay), Kotak 811")]),
        ];
        let shared = [
            ("Title", "Flat 15% off"),
            ("Description", "Weekend dining"),
            ("Link", "https://www.example.com/deal/"),
        ];
        let mut swiggy_row = shared.to_vec();
        swiggy_row.push(("Eligible Credit Cards", "HDFC Regalia"));
        let mut zomato_row = shared.to_vec();
        zomato_row[2] = ("Link", "http://example.com/deal");
        zomato_row.push(("Eligible Credit Cards", "Hdfc regalia (Visa)"));

        let sources = vec![
            OfferTable::new(SiteTag::Swiggy, vec![row(&swiggy_row)]),
            OfferTable::new(
                SiteTag::Zomato,
                vec![
                    row(&zomato_row),
                    row(&[
                        ("Title", "Rs 100 off"),
                        ("Eligible Debit Cards", "SBI Card (RuPay)"),
                        ("Coupon Code", "SBI100"),
                    ]),
                ],
            ),
            OfferTable::new(
                SiteTag::Permanent,
                vec![row(&[("Eligible Credit Cards", "HDFC Regalia"), ("Benefit", "Lounge access")])],
            ),
            OfferTable::new(SiteTag::EazyDiner, vec![]),
        ];
        Lookup::new(TableSnapshot::new(reference, sources), AppConfig::default())
    }

    #[test]
    fn test_catalogs_built_once() {
        let lookup = sample();
        assert_eq!(lookup.catalogs().selectable.credit.names(), vec!["HDFC Regalia", "SBI Card"]);
        assert_eq!(lookup.catalogs().selectable.debit.names(), vec!["Kotak 811", "SBI Card"]);
        assert_eq!(lookup.catalogs().with_offers.credit.names(), vec!["HDFC Regalia"]);
        assert_eq!(lookup.catalogs().with_offers.debit.names(), vec!["SBI Card"]);
    }

    #[test]
    fn test_offers_for_credit_card() {
        let lookup = sample();
        let card = lookup.select_chip("HDFC Regalia", CardKind::Credit);
        let groups = lookup.offers_for(&card);

        let sites: Vec<SiteTag> = groups.iter().map(|g| g.site).collect();
        assert_eq!(sites, vec![SiteTag::Permanent, SiteTag::Swiggy]);
        assert!(groups[0].offers[0].inbuilt);
        assert_eq!(groups[0].offers[0].description.as_deref(), Some("Lounge access"));
        assert_eq!(groups[1].offers[0].title.as_deref(), Some("Flat 15% off"));
        assert_eq!(lookup.matched_offers(&card).len(), 3);
    }

    #[test]
    fn test_offers_for_debit_card_with_variant() {
        let lookup = sample();
        let card = match lookup.suggest("sbi card dc") {
            Suggestions::Matches(groups) => {
                assert_eq!(groups[0].kind, CardKind::Debit);
                groups[0].cards[0].clone()
            }
            other => panic!("unexpected {:?}", other),
        };
        let groups = lookup.offers_for(&card);
        assert_eq!(groups.len(), 1);
        let offer = &groups[0].offers[0];
        assert_eq!(offer.site, SiteTag::Zomato);
        assert_eq!(offer.variant_note.as_deref(), Some("RuPay"));
        assert_eq!(offer.coupon_code.as_deref(), Some("SBI100"));
    }

    #[test]
    fn test_offer_groups_as_json() {
        let lookup = sample();
        let card = lookup.select_chip("HDFC Regalia", CardKind::Credit);
        let json = serde_json::to_value(lookup.offers_for(&card)).unwrap();

        assert_eq!(json[0]["site"], "Permanent");
        assert_eq!(json[0]["offers"][0]["inbuilt"], true);
        assert_eq!(json[1]["site"], "Swiggy");
        assert_eq!(json[1]["offers"][0]["title"], "Flat 15% off");
        assert_eq!(json[1]["offers"][0]["coupon_code"], serde_json::Value::Null);
    }

    #[test]
    fn test_no_offers_for_unknown_card() {
        let lookup = sample();
        let card = CardIdentity::synthetic(CardKind::Credit, "Made Up Card");
        assert!(lookup.offers_for(&card).is_empty());
    }

    #[test]
    fn test_empty_snapshot() {
        let lookup = Lookup::new(TableSnapshot::default(), AppConfig::default());
        assert_eq!(lookup.suggest(""), Suggestions::NoQuery);
        assert!(lookup.suggest("hdfc").is_no_match());
        assert!(lookup.offers_for(&CardIdentity::new(CardKind::Credit, "HDFC")).is_empty());
    }
}
