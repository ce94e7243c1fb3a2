// src/sentiment.rs
//! Lexicon + phrase scoring.
//!
//! Phrases are matched first (±2 each) and consumed so their words are not counted
//! again; remaining tokens are looked up in the root-word sets (±1 each). A zero
//! score is resolved by hit counts with negative winning ties.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::config::{LexiconConfig, PhraseConfig};
use crate::error::{PipelineError, Result};
use crate::preprocess::{Stemmer, StopwordFilter};

pub const PHRASE_WEIGHT: i32 = 2;
pub const WORD_WEIGHT: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

/// How labels are spelled in output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    #[default]
    English,
    /// `Positif` / `Negatif` / `Netral`
    Indonesian,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Positive, Label::Negative, Label::Neutral];

    pub fn as_str(&self) -> &'static str {
        self.styled(LabelStyle::English)
    }

    pub fn styled(&self, style: LabelStyle) -> &'static str {
        match (self, style) {
            (Label::Positive, LabelStyle::English) => "Positive",
            (Label::Negative, LabelStyle::English) => "Negative",
            (Label::Neutral, LabelStyle::English) => "Neutral",
            (Label::Positive, LabelStyle::Indonesian) => "Positif",
            (Label::Negative, LabelStyle::Indonesian) => "Negatif",
            (Label::Neutral, LabelStyle::Indonesian) => "Netral",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root-word sets and phrase lists, already in stemmed form.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    positive_phrases: Vec<String>,
    negative_phrases: Vec<String>,
}

impl Lexicon {
    /// Build from entries that are already in the scorer's input form.
    pub fn new<W, P>(
        positive: W,
        negative: W,
        positive_phrases: P,
        negative_phrases: P,
    ) -> Result<Self>
    where
        W: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        let keep = |s: String| {
            let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
            (!s.is_empty()).then_some(s)
        };
        let positive: HashSet<String> = positive.into_iter().filter_map(keep).collect();
        let negative: HashSet<String> = negative.into_iter().filter_map(keep).collect();
        let positive_phrases = dedup_ordered(positive_phrases.into_iter().filter_map(keep));
        let negative_phrases = dedup_ordered(negative_phrases.into_iter().filter_map(keep));

        let overlap: BTreeSet<&String> = positive.intersection(&negative).collect();
        if !overlap.is_empty() {
            let words = overlap.into_iter().cloned().collect::<Vec<_>>().join(", ");
            return Err(PipelineError::Configuration(format!(
                "words listed as both positive and negative: {words}"
            )));
        }
        if positive_phrases.is_empty() {
            return Err(PipelineError::Configuration(
                "positive phrase list is empty".into(),
            ));
        }
        if negative_phrases.is_empty() {
            return Err(PipelineError::Configuration(
                "negative phrase list is empty".into(),
            ));
        }

        Ok(Self {
            positive,
            negative,
            positive_phrases,
            negative_phrases,
        })
    }

    /// Stem every word and phrase so they line up with processed text.
    pub fn build(
        words: &LexiconConfig,
        phrases: &PhraseConfig,
        stemmer: &dyn Stemmer,
    ) -> Result<Self> {
        let stem_all =
            |items: &[String]| items.iter().map(|s| stemmer.stem(s)).collect::<Vec<_>>();
        Self::new(
            stem_all(&words.positive),
            stem_all(&words.negative),
            stem_all(&phrases.positive),
            stem_all(&phrases.negative),
        )
    }

    pub fn positive_words(&self) -> &HashSet<String> {
        &self.positive
    }

    pub fn negative_words(&self) -> &HashSet<String> {
        &self.negative
    }

    pub fn positive_phrases(&self) -> &[String] {
        &self.positive_phrases
    }

    pub fn negative_phrases(&self) -> &[String] {
        &self.negative_phrases
    }

    /// Root words plus phrases, both polarities.
    pub fn entry_count(&self) -> usize {
        self.positive.len()
            + self.negative.len()
            + self.positive_phrases.len()
            + self.negative_phrases.len()
    }

    /// Entries that can never match processed text. Reported, not rejected.
    pub fn lint(&self, stopwords: &StopwordFilter) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut words: Vec<&String> =
            self.positive.iter().chain(self.negative.iter()).collect();
        words.sort();
        for w in words {
            if w.contains(' ') {
                warnings.push(format!(
                    "lexicon entry `{w}` has several words; only phrases match multi-word text"
                ));
            } else if has_stripped_chars(w) {
                warnings.push(format!(
                    "lexicon entry `{w}` contains characters removed by normalization"
                ));
            } else if stopwords.contains(w) {
                warnings.push(format!(
                    "lexicon entry `{w}` is a stopword and is removed before scoring"
                ));
            }
        }

        for p in self.positive_phrases.iter().chain(self.negative_phrases.iter()) {
            if has_stripped_chars(p) {
                warnings.push(format!(
                    "phrase `{p}` contains characters removed by normalization"
                ));
            }
            let dropped: Vec<&str> = p.split(' ').filter(|t| stopwords.contains(t)).collect();
            if !dropped.is_empty() {
                warnings.push(format!(
                    "phrase `{p}` contains stopwords ({}) and cannot match filtered text",
                    dropped.join(", ")
                ));
            }
        }
        warnings
    }
}

fn has_stripped_chars(s: &str) -> bool {
    s.chars().any(|c| !(c.is_alphabetic() || c == ' '))
}

fn dedup_ordered(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|s| seen.insert(s.clone())).collect()
}

/// Everything the scorer saw while labeling one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub label: Label,
    pub score: i32,
    pub positive_phrases: Vec<String>,
    pub negative_phrases: Vec<String>,
    pub positive_hits: Vec<String>,
    pub negative_hits: Vec<String>,
}

impl ScoreBreakdown {
    fn neutral() -> Self {
        Self {
            label: Label::Neutral,
            score: 0,
            positive_phrases: Vec::new(),
            negative_phrases: Vec::new(),
            positive_hits: Vec::new(),
            negative_hits: Vec::new(),
        }
    }
}

/// Pure scorer over a [`Lexicon`]. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    lexicon: Lexicon,
}

impl SentimentScorer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn label(&self, text: &str) -> Label {
        self.score_text(text).label
    }

    pub fn score_text(&self, text: &str) -> ScoreBreakdown {
        if text.trim().is_empty() {
            return ScoreBreakdown::neutral();
        }

        let mut out = ScoreBreakdown::neutral();
        let mut score = 0i32;
        // Local working copy: matched phrases are cut out so their words are not
        // counted twice. A space is left behind so neighbours never fuse.
        let mut working = text.to_string();

        for phrase in &self.lexicon.positive_phrases {
            if working.contains(phrase.as_str()) {
                score += PHRASE_WEIGHT;
                working = working.replace(phrase.as_str(), " ");
                out.positive_phrases.push(phrase.clone());
            }
        }
        for phrase in &self.lexicon.negative_phrases {
            if working.contains(phrase.as_str()) {
                score -= PHRASE_WEIGHT;
                working = working.replace(phrase.as_str(), " ");
                out.negative_phrases.push(phrase.clone());
            }
        }

        for word in working.split_whitespace() {
            // positive first: wins if the sets were ever allowed to overlap
            if self.lexicon.positive.contains(word) {
                score += WORD_WEIGHT;
                out.positive_hits.push(word.to_string());
            } else if self.lexicon.negative.contains(word) {
                score -= WORD_WEIGHT;
                out.negative_hits.push(word.to_string());
            }
        }

        out.score = score;
        out.label = resolve_label(score, out.positive_hits.len(), out.negative_hits.len());
        out
    }
}

/// Sign of the score decides; a zero score falls back to word hits, negative first.
pub fn resolve_label(score: i32, positive_hits: usize, negative_hits: usize) -> Label {
    match score {
        s if s > 0 => Label::Positive,
        s if s < 0 => Label::Negative,
        _ if negative_hits > 0 => Label::Negative,
        _ if positive_hits > 0 => Label::Positive,
        _ => Label::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::{DictionaryStemmer, IdentityStemmer};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scorer() -> SentimentScorer {
        let lex = Lexicon::new(
            strings(&["enak", "sehat", "bahagia", "semangat", "layak"]),
            strings(&["basi", "hambar", "lalat", "bau"]),
            strings(&["sangat layak", "kerja nyata"]),
            strings(&["tidak layak", "bau anyep", "banyak lalat"]),
        )
        .unwrap();
        SentimentScorer::new(lex)
    }

    #[test]
    fn empty_text_is_neutral() {
        let s = scorer();
        assert_eq!(s.label(""), Label::Neutral);
        assert_eq!(s.score_text("   ").score, 0);
    }

    #[test]
    fn counts_words() {
        let b = scorer().score_text("nasi enak sehat bahagia");
        assert_eq!(b.score, 3);
        assert_eq!(b.label, Label::Positive);
        assert_eq!(b.positive_hits, vec!["enak", "sehat", "bahagia"]);
    }

    #[test]
    fn negative_phrase_outweighs_positive_word() {
        let b = scorer().score_text("menu tidak layak tapi sehat");
        assert_eq!(b.score, -1);
        assert_eq!(b.label, Label::Negative);
        assert_eq!(b.negative_phrases, vec!["tidak layak"]);
    }

    #[test]
    fn consumed_phrase_is_not_counted_as_word() {
        // "layak" inside "sangat layak" must not add a word hit
        let b = scorer().score_text("sangat layak");
        assert_eq!(b.score, 2);
        assert!(b.positive_hits.is_empty());
    }

    #[test]
    fn phrase_removal_does_not_block_words_outside_its_span() {
        let b = scorer().score_text("enakbau anyepsehat basi");
        // phrase cut leaves a separator: "enak" and "sehat" are tokens again
        assert_eq!(b.negative_phrases, vec!["bau anyep"]);
        assert_eq!(b.positive_hits, vec!["enak", "sehat"]);
        assert_eq!(b.negative_hits, vec!["basi"]);
        assert_eq!(b.score, -2 + 2 - 1);
        assert_eq!(b.label, Label::Negative);
    }

    #[test]
    fn all_occurrences_of_a_phrase_count_once() {
        let b = scorer().score_text("banyak lalat dan banyak lalat");
        assert_eq!(b.score, -2);
        assert!(b.negative_hits.is_empty());
    }

    #[test]
    fn zero_score_tie_goes_negative() {
        let b = scorer().score_text("enak tapi basi");
        assert_eq!(b.score, 0);
        assert_eq!(b.label, Label::Negative);
    }

    #[test]
    fn zero_score_without_hits_is_neutral() {
        assert_eq!(scorer().label("nasi kotak siang"), Label::Neutral);
    }

    #[test]
    fn zero_score_with_only_positive_hits_is_positive() {
        assert_eq!(resolve_label(0, 1, 0), Label::Positive);
        assert_eq!(resolve_label(0, 1, 1), Label::Negative);
        assert_eq!(resolve_label(0, 0, 0), Label::Neutral);
    }

    #[test]
    fn cancelling_phrases_without_word_hits_are_neutral() {
        let b = scorer().score_text("sangat layak bau anyep");
        assert_eq!(b.score, 0);
        assert_eq!(b.label, Label::Neutral);
    }

    #[test]
    fn order_of_calls_does_not_matter() {
        let s = scorer();
        let a1 = s.score_text("enak tapi basi");
        let b1 = s.score_text("sangat layak");
        let b2 = s.score_text("sangat layak");
        let a2 = s.score_text("enak tapi basi");
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }

    #[test]
    fn overlap_is_a_configuration_error() {
        let err = Lexicon::new(
            strings(&["enak", "basi"]),
            strings(&["basi"]),
            strings(&["a b"]),
            strings(&["c d"]),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(ref m) if m.contains("basi")));
    }

    #[test]
    fn empty_phrase_list_is_a_configuration_error() {
        let err = Lexicon::new(strings(&["enak"]), strings(&["basi"]), vec![], strings(&["c d"]))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn build_stems_entries() {
        let stemmer = DictionaryStemmer::new([("membantu", "bantu"), ("keracunan", "racun")]);
        let words = LexiconConfig {
            positive: strings(&["membantu"]),
            negative: strings(&["keracunan", "racun"]),
        };
        let phrases = PhraseConfig {
            positive: strings(&["sangat membantu"]),
            negative: strings(&["ada racun"]),
        };
        let lex = Lexicon::build(&words, &phrases, &stemmer).unwrap();
        assert!(lex.positive_words().contains("bantu"));
        assert_eq!(lex.negative_words().len(), 1);
        assert_eq!(lex.positive_phrases().to_vec(), vec!["sangat bantu".to_string()]);
    }

    #[test]
    fn lint_reports_unmatchable_entries() {
        let words = LexiconConfig {
            positive: strings(&["anak bangsa", "enak", "pasti"]),
            negative: strings(&["sia-sia"]),
        };
        let phrases = PhraseConfig {
            positive: strings(&["sangat layak"]),
            negative: strings(&["tidak layak"]),
        };
        let lex = Lexicon::build(&words, &phrases, &IdentityStemmer).unwrap();
        let warnings = lex.lint(&StopwordFilter::new(true, Vec::<String>::new()));
        assert_eq!(warnings.len(), 4, "{warnings:#?}");
        assert!(warnings.iter().any(|w| w.contains("anak bangsa")));
        assert!(warnings.iter().any(|w| w.contains("sia-sia")));
        assert!(warnings.iter().any(|w| w.contains("`pasti`")));
        assert!(warnings.iter().any(|w| w.contains("tidak layak")));
    }

    #[test]
    fn label_styles() {
        assert_eq!(Label::Negative.to_string(), "Negative");
        assert_eq!(Label::Neutral.styled(LabelStyle::Indonesian), "Netral");
    }
}
