// src/pipeline/mod.rs
//! Orchestrator: normalize → (drop empty) → dedup → slang → stopwords → stem →
//! score, over a whole collection of records.
//!
//! Per-record work is independent and runs on rayon's pool; dedup and the summary
//! are the only sequential steps. The pipeline holds nothing but immutable
//! configuration, so one instance can serve many runs (and many threads).

pub mod observer;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::{SentimentConfig, StemmerKind};
use crate::error::Result;
use crate::preprocess::{
    normalize_opt, verify_stemmer, ContentFilter, DictionaryStemmer, IdentityStemmer,
    SlangResolver, Stemmer, StopwordFilter,
};
use crate::sentiment::{Label, Lexicon, ScoreBreakdown, SentimentScorer};

pub use observer::{
    MetricsObserver, NoopObserver, ObserverSet, PipelineObserver, Stage, TracingObserver,
};

/// One input row. Never modified after ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub favorite_count: Option<String>,
    #[serde(default)]
    pub retweet_count: Option<String>,
    #[serde(default)]
    pub reply_count: Option<String>,
    /// Manually assigned label carried through to the output, if the input had one.
    #[serde(default)]
    pub label: Option<String>,
}

impl Record {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Derived statistics, computed on the cleaned text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub text_length: usize,
    pub word_count: usize,
    pub has_image: bool,
    pub favorite_count: i64,
    pub retweet_count: i64,
    pub reply_count: i64,
}

impl TextStats {
    pub fn derive(record: &Record, cleaned: &str) -> Self {
        Self {
            text_length: cleaned.chars().count(),
            word_count: cleaned.split_whitespace().count(),
            has_image: record
                .image_url
                .as_deref()
                .is_some_and(|u| !u.trim().is_empty()),
            favorite_count: coerce_count(record.favorite_count.as_deref()),
            retweet_count: coerce_count(record.retweet_count.as_deref()),
            reply_count: coerce_count(record.reply_count.as_deref()),
        }
    }
}

/// Numeric coercion for engagement counters: missing or non-numeric → 0,
/// `"12.0"` → 12.
pub fn coerce_count(raw: Option<&str>) -> i64 {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    if let Ok(v) = s.parse::<i64>() {
        return v;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedRecord {
    pub record: Record,
    pub cleaned_text: String,
    pub processed_text: String,
    pub breakdown: ScoreBreakdown,
    pub stats: TextStats,
}

impl ProcessedRecord {
    pub fn label(&self) -> Label {
        self.breakdown.label
    }
}

/// Result of running the per-record chain on a single text.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub cleaned_text: String,
    pub processed_text: String,
    #[serde(flatten)]
    pub breakdown: ScoreBreakdown,
}

impl From<ProcessedRecord> for Analysis {
    fn from(r: ProcessedRecord) -> Self {
        Self {
            cleaned_text: r.cleaned_text,
            processed_text: r.processed_text,
            breakdown: r.breakdown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Drop records whose cleaned text is empty (before dedup).
    pub drop_empty: bool,
    /// Collapse records with identical cleaned text, first occurrence wins.
    pub dedup: bool,
    /// Apply the content filter to processed text and drop rejected records.
    pub validate: bool,
    /// Spread per-record work over rayon's pool.
    pub parallel: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            drop_empty: false,
            dedup: true,
            validate: false,
            parallel: true,
        }
    }
}

impl PipelineOptions {
    /// Settings for the statistics-only preprocessing run.
    pub fn preprocessing() -> Self {
        Self {
            drop_empty: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub generated_at: DateTime<Utc>,
    pub input_records: usize,
    pub empty_dropped: usize,
    pub duplicates_dropped: usize,
    pub invalid_dropped: usize,
    pub output_records: usize,
    pub mean_text_length: f64,
    pub mean_word_count: f64,
    pub with_image: usize,
    pub without_image: usize,
    pub labels: BTreeMap<Label, usize>,
    pub elapsed_ms: u64,
}

impl Summary {
    pub fn total_dropped(&self) -> usize {
        self.input_records - self.output_records
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<ProcessedRecord>,
    pub summary: Summary,
}

/// Keep the first item for every distinct key, preserving order.
/// Returns the kept items and how many were removed.
pub fn dedup_first_seen<T, F>(items: Vec<T>, key: F) -> (Vec<T>, usize)
where
    F: Fn(&T) -> &str,
{
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len());
    let mut removed = 0usize;
    for it in items {
        if !seen.insert(key(&it).to_string()) {
            removed += 1;
            continue;
        }
        keep.push(it);
    }
    (keep, removed)
}

fn map_records<T, U, F>(items: Vec<T>, parallel: bool, f: F) -> Vec<U>
where
    T: Send,
    U: Send,
    F: Fn(T) -> U + Sync + Send,
{
    if parallel {
        items.into_par_iter().map(f).collect()
    } else {
        items.into_iter().map(f).collect()
    }
}

pub struct Pipeline {
    slang: SlangResolver,
    stopwords: StopwordFilter,
    stemmer: Arc<dyn Stemmer>,
    scorer: SentimentScorer,
    content_filter: ContentFilter,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("slang_entries", &self.slang.len())
            .field("stopwords", &self.stopwords.len())
            .field("stemmer", &self.stemmer.name())
            .field("content_filter", &self.content_filter)
            .finish()
    }
}

impl Pipeline {
    /// Build every component from configuration, with the stemmer it names.
    pub fn from_config(cfg: &SentimentConfig) -> Result<Self> {
        let stemmer: Arc<dyn Stemmer> = match cfg.stemmer.kind {
            StemmerKind::Dictionary => Arc::new(DictionaryStemmer::new(&cfg.stemmer.roots)),
            StemmerKind::Identity => Arc::new(IdentityStemmer),
        };
        Self::with_stemmer(cfg, stemmer)
    }

    /// Build with an injected stemmer. The stemmer is probed once here; lexicon and
    /// phrases are stemmed through it so they line up with processed text.
    pub fn with_stemmer(cfg: &SentimentConfig, stemmer: Arc<dyn Stemmer>) -> Result<Self> {
        verify_stemmer(stemmer.as_ref())?;

        let slang = SlangResolver::new(&cfg.slang);
        let stopwords = StopwordFilter::new(cfg.stopwords.use_library, &cfg.stopwords.manual);
        let lexicon = Lexicon::build(&cfg.lexicon, &cfg.phrases, stemmer.as_ref())?;

        info!(
            stemmer = stemmer.name(),
            slang = slang.len(),
            stopwords = stopwords.len(),
            positive_words = lexicon.positive_words().len(),
            negative_words = lexicon.negative_words().len(),
            positive_phrases = lexicon.positive_phrases().len(),
            negative_phrases = lexicon.negative_phrases().len(),
            "pipeline ready"
        );

        Ok(Self {
            slang,
            stopwords,
            stemmer,
            scorer: SentimentScorer::new(lexicon),
            content_filter: ContentFilter::default(),
        })
    }

    pub fn with_content_filter(mut self, filter: ContentFilter) -> Self {
        self.content_filter = filter;
        self
    }

    pub fn scorer(&self) -> &SentimentScorer {
        &self.scorer
    }

    /// Lexicon entries and phrases that can never match processed text.
    pub fn lint(&self) -> Vec<String> {
        self.scorer.lexicon().lint(&self.stopwords)
    }

    /// Slang → stopwords → stem, on already-normalized text.
    pub fn prepare(&self, cleaned: &str) -> String {
        let resolved = self.slang.resolve(cleaned);
        let filtered = self.stopwords.filter(&resolved);
        if filtered.is_empty() {
            return filtered;
        }
        self.stemmer.stem(&filtered)
    }

    /// Full chain on one raw text.
    pub fn analyze(&self, raw: &str) -> Analysis {
        let cleaned_text = normalize_opt(Some(raw));
        let processed_text = self.prepare(&cleaned_text);
        let breakdown = self.scorer.score_text(&processed_text);
        Analysis {
            cleaned_text,
            processed_text,
            breakdown,
        }
    }

    /// [`Pipeline::analyze`], reported to `observer` as one record.
    pub fn analyze_observed(&self, raw: &str, observer: &dyn PipelineObserver) -> Analysis {
        let analysis = self.analyze(raw);
        observer.on_analysis(&analysis);
        analysis
    }

    pub fn run(
        &self,
        records: Vec<Record>,
        opts: &PipelineOptions,
        observer: &dyn PipelineObserver,
    ) -> PipelineOutput {
        let started = Instant::now();
        let input_records = records.len();

        // 1) Normalize
        let mut cleaned = map_records(records, opts.parallel, |r| {
            let c = normalize_opt(r.text.as_deref());
            (r, c)
        });
        observer.on_stage(Stage::Normalized, cleaned.len(), 0);

        // 2) Empty texts (preprocessing runs only)
        let mut empty_dropped = 0usize;
        if opts.drop_empty {
            let before = cleaned.len();
            cleaned.retain(|(_, c)| !c.is_empty());
            empty_dropped = before - cleaned.len();
            observer.on_stage(Stage::EmptyDropped, cleaned.len(), empty_dropped);
        }

        // 3) Exact duplicates of the cleaned text
        let mut duplicates_dropped = 0usize;
        if opts.dedup {
            let (kept, removed) = dedup_first_seen(cleaned, |(_, c)| c.as_str());
            cleaned = kept;
            duplicates_dropped = removed;
            observer.on_stage(Stage::Deduplicated, cleaned.len(), duplicates_dropped);
        }

        // 4) Slang, stopwords, stem, optional content gate, score
        let scored = map_records(cleaned, opts.parallel, |(record, cleaned_text)| {
            let processed_text = self.prepare(&cleaned_text);
            if opts.validate && !self.content_filter.is_valid(&processed_text) {
                return None;
            }
            let breakdown = self.scorer.score_text(&processed_text);
            let stats = TextStats::derive(&record, &cleaned_text);
            Some(ProcessedRecord {
                record,
                cleaned_text,
                processed_text,
                breakdown,
                stats,
            })
        });
        let before = scored.len();
        let records: Vec<ProcessedRecord> = scored.into_iter().flatten().collect();
        let invalid_dropped = before - records.len();
        observer.on_stage(Stage::Labeled, records.len(), invalid_dropped);

        for r in &records {
            observer.on_record(r);
        }

        let summary = summarize(
            &records,
            input_records,
            empty_dropped,
            duplicates_dropped,
            invalid_dropped,
            started.elapsed().as_millis() as u64,
        );
        observer.on_summary(&summary);

        PipelineOutput { records, summary }
    }
}

fn summarize(
    records: &[ProcessedRecord],
    input_records: usize,
    empty_dropped: usize,
    duplicates_dropped: usize,
    invalid_dropped: usize,
    elapsed_ms: u64,
) -> Summary {
    let n = records.len();
    let mean = |f: fn(&TextStats) -> usize| {
        if n == 0 {
            0.0
        } else {
            records.iter().map(|r| f(&r.stats)).sum::<usize>() as f64 / n as f64
        }
    };
    let with_image = records.iter().filter(|r| r.stats.has_image).count();

    let mut labels: BTreeMap<Label, usize> = Label::ALL.iter().map(|l| (*l, 0)).collect();
    for r in records {
        *labels.entry(r.label()).or_insert(0) += 1;
    }

    Summary {
        generated_at: Utc::now(),
        input_records,
        empty_dropped,
        duplicates_dropped,
        invalid_dropped,
        output_records: n,
        mean_text_length: mean(|s| s.text_length),
        mean_word_count: mean(|s| s.word_count),
        with_image,
        without_image: n - with_image,
        labels,
        elapsed_ms,
    }
}
