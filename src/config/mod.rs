// src/config/mod.rs
//! Runtime configuration: slang dictionary, stopwords, lexicon, phrases, stemmer.

pub mod sentiment;

pub use sentiment::{
    load_config_default, load_config_from, LexiconConfig, PhraseConfig, SentimentConfig,
    StemmerConfig, StemmerKind, StopwordsConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH,
};
