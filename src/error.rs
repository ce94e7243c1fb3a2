// src/error.rs
//! Error taxonomy for the pipeline.
//!
//! Malformed record text is never an error: it degrades to an empty string and a
//! Neutral label. Everything below is detected once (at startup or when opening a
//! dataset), never per record.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Lexicon overlap, empty phrase list, unusable configuration values.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The injected stemmer is absent or returns malformed output.
    #[error("stemmer capability unavailable: {0}")]
    MissingCapability(String),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset {}: {source}", path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
