//! Text normalization, card-name parsing and similarity scoring.

pub mod card_name;
pub mod normalizer;
pub mod similarity;

pub use card_name::{base_name, split_list, split_opt, variant};
pub use normalizer::{canonicalize_brand, collate, normalize};
pub use similarity::{edit_distance, is_fuzzy_match, key_similarity, score};
