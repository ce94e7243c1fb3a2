// src/config/sentiment.rs
//! Configuration schema and loaders.
//!
//! Lookup order for [`load_config_default`]:
//! 1) `$SENTIMEN_CONFIG_PATH` (must exist when set)
//! 2) `config/sentiment.toml`
//! 3) the copy of `config/sentiment.toml` embedded at build time
//!
//! Both TOML and JSON files are accepted; the extension picks the parser.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_CONFIG_PATH: &str = "SENTIMEN_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";

static EMBEDDED_DEFAULT: &str = include_str!("../../config/sentiment.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub slang: BTreeMap<String, String>,
    #[serde(default)]
    pub stopwords: StopwordsConfig,
    pub lexicon: LexiconConfig,
    pub phrases: PhraseConfig,
    #[serde(default)]
    pub stemmer: StemmerConfig,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopwordsConfig {
    /// Include the bundled Indonesian stopword list.
    #[serde(default = "default_true")]
    pub use_library: bool,
    #[serde(default)]
    pub manual: Vec<String>,
}

impl Default for StopwordsConfig {
    fn default() -> Self {
        Self {
            use_library: true,
            manual: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhraseConfig {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemmerKind {
    #[default]
    Dictionary,
    Identity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StemmerConfig {
    #[serde(default)]
    pub kind: StemmerKind,
    /// Inflected form -> root.
    #[serde(default)]
    pub roots: BTreeMap<String, String>,
}

impl SentimentConfig {
    /// The configuration compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_DEFAULT).context("parsing embedded default configuration")
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: SentimentConfig = toml::from_str(s)?;
        Ok(cfg.cleaned())
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: SentimentConfig = serde_json::from_str(s)?;
        Ok(cfg.cleaned())
    }

    /// Trim + lowercase every entry, drop blanks and repeated entries.
    /// List order is kept: phrase order is matching order.
    fn cleaned(mut self) -> Self {
        self.slang = self
            .slang
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_lowercase()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        self.stopwords.manual = clean_list(self.stopwords.manual);
        self.lexicon.positive = clean_list(self.lexicon.positive);
        self.lexicon.negative = clean_list(self.lexicon.negative);
        self.phrases.positive = clean_list(self.phrases.positive);
        self.phrases.negative = clean_list(self.phrases.negative);
        self
    }
}

/// Load configuration from an explicit path. Supports TOML or JSON.
pub fn load_config_from(path: &Path) -> Result<SentimentConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading configuration from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = match ext.as_str() {
        "json" => SentimentConfig::from_json_str(&content),
        "toml" => SentimentConfig::from_toml_str(&content),
        _ => SentimentConfig::from_toml_str(&content)
            .or_else(|_| SentimentConfig::from_json_str(&content))
            .map_err(|_| anyhow!("unsupported configuration format")),
    };
    cfg.with_context(|| format!("parsing configuration {}", path.display()))
}

/// Load configuration using env var + fallbacks (see module docs).
pub fn load_config_default() -> Result<SentimentConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!(
                "{ENV_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
        info!(path = %pb.display(), "configuration from env");
        return load_config_from(&pb);
    }
    let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_p.exists() {
        info!(path = %default_p.display(), "configuration from working directory");
        return load_config_from(&default_p);
    }
    info!("configuration: embedded default");
    SentimentConfig::embedded()
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && seen.insert(t.clone()) {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[slang]
" YG " = "yang"

[lexicon]
positive = ["Enak", "", "enak", "sehat"]
negative = ["basi"]

[phrases]
positive = ["sangat layak"]
negative = ["tidak layak"]
"#;

    #[test]
    fn embedded_default_parses() {
        let cfg = SentimentConfig::embedded().unwrap();
        assert!(cfg.slang.contains_key("gak"));
        assert!(!cfg.lexicon.positive.is_empty());
        assert!(!cfg.phrases.negative.is_empty());
        assert_eq!(cfg.stemmer.kind, StemmerKind::Dictionary);
        assert!(cfg.stopwords.use_library);
    }

    #[test]
    fn lists_are_trimmed_lowercased_and_deduped_in_order() {
        let cfg = SentimentConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(cfg.lexicon.positive, vec!["enak", "sehat"]);
        assert_eq!(cfg.slang.get("yg").map(String::as_str), Some("yang"));
        // defaults for omitted sections
        assert!(cfg.stopwords.use_library);
        assert!(cfg.stemmer.roots.is_empty());
    }

    #[test]
    fn json_shape_is_accepted() {
        let json = r#"{
            "lexicon": {"positive": ["enak"], "negative": ["basi"]},
            "phrases": {"positive": ["sangat layak"], "negative": ["tidak layak"]},
            "stemmer": {"kind": "identity"}
        }"#;
        let cfg = SentimentConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.stemmer.kind, StemmerKind::Identity);
        assert!(cfg.slang.is_empty());
    }

    #[test]
    fn duplicate_slang_keys_are_rejected() {
        let dup = r#"
[slang]
yg = "yang"
yg = "yg"
[lexicon]
[phrases]
"#;
        assert!(SentimentConfig::from_toml_str(dup).is_err());
    }
}
