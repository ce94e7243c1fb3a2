// src/pipeline/observer.rs
//! Progress and statistics reporting, kept out of the transformation code.
//!
//! The pipeline calls an observer after every stage, once per labeled record and
//! once with the final summary. `TracingObserver` logs, `MetricsObserver` feeds
//! Prometheus counters, `ObserverSet` fans out to several.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use tracing::info;

use super::{Analysis, ProcessedRecord, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalized,
    EmptyDropped,
    Deduplicated,
    Labeled,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalized => "normalized",
            Stage::EmptyDropped => "empty_dropped",
            Stage::Deduplicated => "deduplicated",
            Stage::Labeled => "labeled",
        }
    }
}

pub trait PipelineObserver {
    /// `kept` records continue to the next stage, `removed` were dropped by this one.
    fn on_stage(&self, _stage: Stage, _kept: usize, _removed: usize) {}
    fn on_record(&self, _record: &ProcessedRecord) {}
    fn on_summary(&self, _summary: &Summary) {}
    /// A single text analyzed outside a batch run.
    fn on_analysis(&self, _analysis: &Analysis) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Fan-out to several observers, in insertion order.
#[derive(Default)]
pub struct ObserverSet {
    inner: Vec<Box<dyn PipelineObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.inner.push(Box::new(observer));
        self
    }
}

impl PipelineObserver for ObserverSet {
    fn on_stage(&self, stage: Stage, kept: usize, removed: usize) {
        for o in &self.inner {
            o.on_stage(stage, kept, removed);
        }
    }

    fn on_record(&self, record: &ProcessedRecord) {
        for o in &self.inner {
            o.on_record(record);
        }
    }

    fn on_summary(&self, summary: &Summary) {
        for o in &self.inner {
            o.on_summary(summary);
        }
    }

    fn on_analysis(&self, analysis: &Analysis) {
        for o in &self.inner {
            o.on_analysis(analysis);
        }
    }
}

/* ----------------------------
Tracing
---------------------------- */

pub const ENV_DEV_LOG: &str = "SENTIMEN_DEV_LOG";
pub const ENV_RUNTIME_ENV: &str = "SENTIMEN_ENV";

/// Per-record logging gate: SENTIMEN_DEV_LOG=1 AND dev env
/// (debug build or SENTIMEN_ENV in {local, development, dev}).
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var(ENV_RUNTIME_ENV)
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short stable id for a text, so logs can correlate records without the text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    dev_log: bool,
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingObserver {
    pub fn new() -> Self {
        Self {
            dev_log: dev_logging_enabled(),
        }
    }
}

impl PipelineObserver for TracingObserver {
    fn on_stage(&self, stage: Stage, kept: usize, removed: usize) {
        info!(stage = stage.as_str(), kept, removed, "pipeline stage");
    }

    fn on_record(&self, record: &ProcessedRecord) {
        if !self.dev_log {
            return;
        }
        // Never log raw text. Only hashed id + short hit lists.
        let b = &record.breakdown;
        info!(
            target: "sentimen::dev",
            id = %anon_hash(&record.cleaned_text),
            label = b.label.as_str(),
            score = b.score,
            phrases_pos = ?truncate_vec(&b.positive_phrases, 5),
            phrases_neg = ?truncate_vec(&b.negative_phrases, 5),
            hits_pos = ?truncate_vec(&b.positive_hits, 5),
            hits_neg = ?truncate_vec(&b.negative_hits, 5)
        );
    }

    fn on_summary(&self, s: &Summary) {
        info!(
            input = s.input_records,
            empty_dropped = s.empty_dropped,
            duplicates_dropped = s.duplicates_dropped,
            invalid_dropped = s.invalid_dropped,
            output = s.output_records,
            mean_text_length = s.mean_text_length,
            mean_word_count = s.mean_word_count,
            with_image = s.with_image,
            elapsed_ms = s.elapsed_ms,
            "pipeline summary"
        );
        for (label, count) in &s.labels {
            info!(label = label.as_str(), count, "label distribution");
        }
    }
}

/* ----------------------------
Metrics
---------------------------- */

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_records_total", "Records entering the pipeline.");
        describe_counter!(
            "pipeline_empty_dropped_total",
            "Records dropped because the cleaned text was empty."
        );
        describe_counter!(
            "pipeline_dedup_total",
            "Records removed as exact duplicates of an earlier cleaned text."
        );
        describe_counter!(
            "pipeline_invalid_total",
            "Records rejected by the content filter."
        );
        describe_counter!("pipeline_labels_total", "Labeled records by label.");
        describe_histogram!("pipeline_run_ms", "Pipeline run time in milliseconds.");
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when the pipeline last finished."
        );
        describe_gauge!("lexicon_entries", "Root words and phrases in the loaded lexicon.");
    });
}

#[derive(Debug, Clone, Copy)]
pub struct MetricsObserver;

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsObserver {
    pub fn new() -> Self {
        ensure_metrics_described();
        Self
    }
}

impl PipelineObserver for MetricsObserver {
    fn on_stage(&self, stage: Stage, kept: usize, removed: usize) {
        match stage {
            Stage::Normalized => counter!("pipeline_records_total").increment(kept as u64),
            Stage::EmptyDropped => {
                counter!("pipeline_empty_dropped_total").increment(removed as u64)
            }
            Stage::Deduplicated => counter!("pipeline_dedup_total").increment(removed as u64),
            Stage::Labeled => counter!("pipeline_invalid_total").increment(removed as u64),
        }
    }

    fn on_record(&self, record: &ProcessedRecord) {
        counter!("pipeline_labels_total", "label" => record.breakdown.label.as_str()).increment(1);
    }

    fn on_analysis(&self, analysis: &Analysis) {
        counter!("pipeline_records_total").increment(1);
        counter!("pipeline_labels_total", "label" => analysis.breakdown.label.as_str())
            .increment(1);
    }

    fn on_summary(&self, summary: &Summary) {
        histogram!("pipeline_run_ms").record(summary.elapsed_ms as f64);
        gauge!("pipeline_last_run_ts").set(summary.generated_at.timestamp().max(0) as f64);
    }
}
