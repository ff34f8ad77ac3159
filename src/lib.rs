//! Card-offer lookup engine: normalizes and fuzzy-matches free-text card names
//! against catalogs built from offer tables, then gathers, deduplicates and
//! groups the offers available for a selected card.

pub mod catalog;
pub mod context;
pub mod loader;
pub mod lookup;
pub mod matching;
pub mod models;
pub mod offers;
pub mod opt;
pub mod snapshot;
pub mod suggest;
