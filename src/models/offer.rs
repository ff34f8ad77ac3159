use serde::{Deserialize, Serialize};

use super::card::CardKind;
use super::row::{first_present, FieldAliases, RawRow};
use crate::matching::split_opt;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum SiteTag {
    Permanent,
    Swiggy,
    Zomato,
    EazyDiner,
}

impl SiteTag {
    pub fn is_permanent(&self) -> bool {
        matches!(self, SiteTag::Permanent)
    }

    /// Aliases used when rendering a row of this site. Matching and
    /// fingerprinting always use the generic aliases.
    pub fn presentation_aliases(&self, generic: &FieldAliases) -> FieldAliases {
        let aliases = generic.clone();
        match self {
            SiteTag::Swiggy | SiteTag::EazyDiner => aliases
                .prepend(|a| &mut a.title, &["Offer"])
                .prepend(|a| &mut a.description, &["Offer Description", "Description"])
                .prepend(|a| &mut a.image, &["Images", "Image"]),
            SiteTag::Zomato => aliases.prepend(|a| &mut a.description, &["Description"]),
            SiteTag::Permanent => aliases,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferRecord {
    pub site: SiteTag,
    pub row: RawRow,
    pub eligible_credit: Vec<String>,
    pub eligible_debit: Vec<String>,
}

impl OfferRecord {
    pub fn from_row(site: SiteTag, row: RawRow, aliases: &FieldAliases) -> Self {
        let (eligible_credit, eligible_debit) = if site.is_permanent() {
            let name = first_present(&row, &aliases.permanent_card)
                .map(|name| vec![name.trim().to_string()])
                .unwrap_or_default();
            (name, Vec::new())
        } else {
            (
                split_opt(first_present(&row, &aliases.credit)),
                split_opt(first_present(&row, &aliases.debit)),
            )
        };

        OfferRecord {
            site,
            row,
            eligible_credit,
            eligible_debit,
        }
    }

    pub fn eligible(&self, kind: CardKind) -> &[String] {
        match kind {
            CardKind::Credit => &self.eligible_credit,
            CardKind::Debit => &self.eligible_debit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchedOffer {
    pub offer: OfferRecord,
    pub site: SiteTag,
    /// Suffix of the entry that matched, e.g. "RuPay". Empty when none.
    pub matched_variant: String,
}

/// Render-ready offer. Absent source fields stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferView {
    pub site: SiteTag,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Site logo to show when `image_url` is missing or a placeholder.
    pub fallback_image: Option<String>,
    pub link: Option<String>,
    pub variant_note: Option<String>,
    pub coupon_code: Option<String>,
    pub inbuilt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferGroup {
    pub site: SiteTag,
    pub offers: Vec<OfferView>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_offer_record_lists() {
        let aliases = FieldAliases::default();
        let row = RawRow::from_pairs([
            ("Eligible Cards", "HDFC Regalia (Visa), SBI Card"),
            ("Applicable Debit Cards", "Axis Debit"),
        ]);
        let record = OfferRecord::from_row(SiteTag::Zomato, row, &aliases);
        assert_eq!(record.eligible(CardKind::Credit), ["HDFC Regalia (Visa)", "SBI Card"]);
        assert_eq!(record.eligible(CardKind::Debit), ["Axis Debit"]);
    }

    #[test]
    fn test_permanent_record_is_single_credit_entry() {
        let aliases = FieldAliases::default();
        let row = RawRow::from_pairs([("Eligible Credit Cards", "Swiggy HDFC, Edition 2"), ("Offer", "10% cashback")]);
        let record = OfferRecord::from_row(SiteTag::Permanent, row, &aliases);
        assert_eq!(record.eligible_credit, vec!["Swiggy HDFC, Edition 2"]);
        assert!(record.eligible_debit.is_empty());
    }

    #[test]
    fn test_presentation_aliases() {
        let generic = FieldAliases::default();
        let swiggy = SiteTag::Swiggy.presentation_aliases(&generic);
        assert_eq!(swiggy.title[0], "Offer");
        assert_eq!(swiggy.image[0], "Images");
        assert_eq!(SiteTag::Permanent.presentation_aliases(&generic), generic);
        assert_eq!("eazydiner".parse::<SiteTag>(), Ok(SiteTag::EazyDiner));
    }
}
