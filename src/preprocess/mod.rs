// src/preprocess/mod.rs
//! Text preparation stages, applied in this order:
//! normalize → slang → stopwords → stem.
//!
//! Every stage takes and returns a lowercase, single-spaced string.

pub mod normalize;
pub mod slang;
pub mod stem;
pub mod stopwords;
pub mod validity;

pub use normalize::{normalize, normalize_opt};
pub use slang::SlangResolver;
pub use stem::{verify_stemmer, DictionaryStemmer, IdentityStemmer, Stemmer};
pub use stopwords::StopwordFilter;
pub use validity::{ContentFilter, LanguageDetector};
