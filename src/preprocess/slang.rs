// src/preprocess/slang.rs
//! Slang / abbreviation resolution (`yg` → `yang`, `gak` → `tidak`).

use std::collections::HashMap;

/// Token-wise dictionary substitution over normalized text.
///
/// A single pass: a replacement is never looked up again, even when it is itself a
/// dictionary key.
#[derive(Debug, Clone, Default)]
pub struct SlangResolver {
    map: HashMap<String, String>,
}

impl SlangResolver {
    /// Keys are trimmed and lowercased to match normalizer output; entries with an
    /// empty key are skipped.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let map = entries
            .into_iter()
            .filter_map(|(k, v)| {
                let k = k.as_ref().trim().to_lowercase();
                if k.is_empty() {
                    None
                } else {
                    Some((k, v.as_ref().trim().to_string()))
                }
            })
            .collect();
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn resolve(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|w| self.map.get(w).map(String::as_str).unwrap_or(w))
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
