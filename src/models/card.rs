use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::matching::{base_name, canonicalize_brand, normalize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum_macros::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum CardKind {
    Credit,
    Debit,
}

impl CardKind {
    pub fn heading(&self) -> &'static str {
        match self {
            CardKind::Credit => "Credit Cards",
            CardKind::Debit => "Debit Cards",
        }
    }
}

impl Display for CardKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            CardKind::Credit => write!(f, "Credit"),
            CardKind::Debit => write!(f, "Debit"),
        }
    }
}

/// A card as the user sees it. `normalized_key` is the identity used for
/// matching and is always `normalize(display_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardIdentity {
    pub kind: CardKind,
    pub display_name: String,
    pub normalized_key: String,
    /// Built from free text that matched nothing in the catalog.
    pub synthetic: bool,
}

impl CardIdentity {
    pub fn new(kind: CardKind, display_name: &str) -> Self {
        CardIdentity {
            kind,
            display_name: display_name.to_string(),
            normalized_key: normalize(display_name),
            synthetic: false,
        }
    }

    /// Identity of a raw table entry such as `"Hdfc Regalia (Visa)"`.
    pub fn from_entry(kind: CardKind, raw: &str) -> Self {
        Self::new(kind, &display_form(raw))
    }

    pub fn synthetic(kind: CardKind, typed: &str) -> Self {
        CardIdentity {
            synthetic: true,
            ..Self::from_entry(kind, typed.trim())
        }
    }
}

impl Display for CardIdentity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name, self.kind)
    }
}

pub fn display_form(raw: &str) -> String {
    canonicalize_brand(&base_name(raw))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_entry() {
        let card = CardIdentity::from_entry(CardKind::Credit, "Hdfc Regalia (Visa)");
        assert_eq!(card.display_name, "HDFC Regalia");
        assert_eq!(card.normalized_key, "hdfc regalia");
        assert!(!card.synthetic);
    }

    #[test]
    fn test_synthetic() {
        let card = CardIdentity::synthetic(CardKind::Debit, "  sbi unknown card ");
        assert_eq!(card.display_name, "SBI unknown card");
        assert_eq!(card.kind, CardKind::Debit);
        assert!(card.synthetic);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("debit".parse::<CardKind>(), Ok(CardKind::Debit));
        assert_eq!(CardKind::Credit.heading(), "Credit Cards");
    }
}
