use std::collections::HashSet;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::matching::{normalize, variant};
use crate::models::*;
use crate::opt::*;

/// Placeholder image cells that mean "no image".
const UNUSABLE_IMAGES: [&str; 6] = ["na", "n/a", "null", "undefined", "-", "image unavailable"];

lazy_static! {
    static ref URL_SCHEME: Regex = Regex::new(r"^https?://").unwrap();
}

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Offers);
}

/// Rows of one source whose eligible list names `card`. Inbuilt benefits
/// only ever apply to credit cards.
pub fn match_offers(card: &CardIdentity, records: &[OfferRecord]) -> Vec<MatchedOffer> {
    records
        .iter()
        .filter(|record| !record.site.is_permanent() || card.kind == CardKind::Credit)
        .filter_map(|record| {
            record
                .eligible(card.kind)
                .iter()
                .find(|raw| normalize(&display_form(raw)) == card.normalized_key)
                .map(|raw| MatchedOffer {
                    offer: record.clone(),
                    site: record.site,
                    matched_variant: variant(raw),
                })
        })
        .collect()
}

pub fn normalize_url(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let stripped = URL_SCHEME.replace(&lowered, "");
    let without_scheme: &str = &stripped;
    let host = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);
    host.strip_suffix('/').unwrap_or(host).to_string()
}

/// Identity of an offer's visible content, shared across sources.
pub fn fingerprint(offer: &OfferRecord, aliases: &FieldAliases) -> String {
    let row = &offer.row;
    let title = first_present(row, &aliases.title)
        .or_else(|| first_present(row, &aliases.website))
        .unwrap_or_default();
    let description = first_present(row, &aliases.description).unwrap_or_default();
    let image = first_present(row, &aliases.image).unwrap_or_default();
    let link = first_present(row, &aliases.link).unwrap_or_default();

    [
        normalize(title),
        normalize(description),
        normalize_url(image),
        normalize_url(link),
    ]
    .iter()
    .join("||")
}

/// Keeps the first offer of every fingerprint. Input must already be in
/// source priority order.
pub fn dedup<I>(matched: I, aliases: &FieldAliases) -> Vec<MatchedOffer>
where
    I: IntoIterator<Item = MatchedOffer>,
{
    let mut seen = HashSet::new();
    matched
        .into_iter()
        .filter(|m| seen.insert(fingerprint(&m.offer, aliases)))
        .collect()
}

pub fn is_usable_image(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !UNUSABLE_IMAGES
            .iter()
            .any(|placeholder| value.eq_ignore_ascii_case(placeholder))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteStyle {
    pub variant_note: bool,
    pub fallback_image: Option<String>,
}

pub fn build_view(matched: &MatchedOffer, aliases: &FieldAliases, style: &SiteStyle) -> OfferView {
    let site = matched.site;
    let row = &matched.offer.row;
    let shown = site.presentation_aliases(aliases);
    let field = |names: &[String]| first_present(row, names).map(str::to_string);

    let image_url = field(&shown.image);
    let fallback_image = match &image_url {
        Some(url) if is_usable_image(url) => None,
        _ => style.fallback_image.clone(),
    };
    let variant_note = (style.variant_note && !matched.matched_variant.trim().is_empty())
        .then(|| matched.matched_variant.trim().to_string());

    let description = if site.is_permanent() {
        field(&shown.permanent_benefit)
    } else {
        field(&shown.description)
    };
    let coupon_code = match site {
        SiteTag::Zomato => field(&shown.coupon_code),
        _ => None,
    };

    OfferView {
        site,
        title: field(&shown.title).or_else(|| field(&shown.website)),
        description,
        image_url,
        fallback_image,
        link: field(&shown.link),
        variant_note,
        coupon_code,
        inbuilt: site.is_permanent(),
    }
}

pub fn group_by_site<F>(deduped: &[MatchedOffer], mut view: F) -> Vec<OfferGroup>
where
    F: FnMut(&MatchedOffer) -> OfferView,
{
    let mut groups: Vec<OfferGroup> = Vec::new();
    for matched in deduped {
        let offer = view(matched);
        match groups.last_mut() {
            Some(group) if group.site == matched.site => group.offers.push(offer),
            _ => groups.push(OfferGroup {
                site: matched.site,
                offers: vec![offer],
            }),
        }
    }

    log(format!(
        "Grouped {} offer(s) into {} site group(s)",
        deduped.len(),
        groups.len()
    ));
    groups
}
