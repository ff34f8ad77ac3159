pub mod card;
pub mod offer;
pub mod row;

pub use card::{display_form, CardIdentity, CardKind};
pub use offer::{MatchedOffer, OfferGroup, OfferRecord, OfferView, SiteTag};
pub use row::{first_present, FieldAliases, RawRow};
