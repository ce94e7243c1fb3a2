// src/preprocess/stem.rs
//! Stemming capability.
//!
//! The pipeline does not implement Indonesian affix stripping itself; it consumes
//! any [`Stemmer`] that maps a space-joined string to the same tokens in root form.
//! Two adapters ship with the crate: [`IdentityStemmer`] (no-op) and
//! [`DictionaryStemmer`] (root-word lookup table from configuration).

use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// Reduces every word of a space-joined string to its root form, preserving token
/// order and count. Implementations must be pure and thread-safe.
pub trait Stemmer: Send + Sync {
    fn stem(&self, text: &str) -> String;

    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Leaves every token untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Looks each token up in an `inflected -> root` table; unknown tokens pass through.
#[derive(Debug, Clone, Default)]
pub struct DictionaryStemmer {
    roots: HashMap<String, String>,
}

impl DictionaryStemmer {
    pub fn new<I, K, V>(roots: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let roots = roots
            .into_iter()
            .filter_map(|(k, v)| {
                let k = k.as_ref().trim().to_lowercase();
                let v = v.as_ref().trim().to_lowercase();
                // a root must stay a single token or the count contract breaks
                if k.is_empty() || v.is_empty() || v.contains(char::is_whitespace) {
                    None
                } else {
                    Some((k, v))
                }
            })
            .collect();
        Self { roots }
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl Stemmer for DictionaryStemmer {
    fn stem(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|w| self.roots.get(w).map(String::as_str).unwrap_or(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn name(&self) -> &'static str {
        "dictionary"
    }
}

const PROBE: &str = "para pejabat sedang membagikan makanan bergizi kepada anak sekolah";

/// Probe a stemmer once before any record is processed.
///
/// Fails when the output token count differs from the input or a token comes
/// back empty: either would silently corrupt every record's score.
pub fn verify_stemmer(stemmer: &dyn Stemmer) -> Result<()> {
    let out = stemmer.stem(PROBE);
    let expected = PROBE.split_whitespace().count();
    let got = out.split_whitespace().count();
    if got != expected {
        return Err(PipelineError::MissingCapability(format!(
            "stemmer `{}` returned {got} tokens for a {expected}-token probe",
            stemmer.name()
        )));
    }
    if out.split(' ').any(str::is_empty) {
        return Err(PipelineError::MissingCapability(format!(
            "stemmer `{}` returned malformed spacing: {out:?}",
            stemmer.name()
        )));
    }
    Ok(())
}
