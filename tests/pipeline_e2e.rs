// tests/pipeline_e2e.rs
//
// End-to-end behaviour of the orchestrator over small in-memory datasets.
// Most cases use a tiny fixed configuration so expectations stay readable;
// the first two run against the shipped default configuration.

use std::sync::Arc;

use sosmed_sentiment::config::SentimentConfig;
use sosmed_sentiment::pipeline::{NoopObserver, Pipeline, PipelineOptions, Record};
use sosmed_sentiment::preprocess::{ContentFilter, LanguageDetector, Stemmer};
use sosmed_sentiment::{Label, PipelineError};

const SMALL: &str = r#"
[slang]
yg = "yang"
tuh = "itu"
itu = "tersebut"
mantul = "mantap"

[stopwords]
use_library = false
manual = ["yang", "ini", "itu", "dan"]

[lexicon]
positive = ["enak", "mantap", "bantu", "bahagia"]
negative = ["basi", "racun", "mahal"]

[phrases]
positive = ["makan gratis"]
negative = ["sangat basi"]

[stemmer]
kind = "dictionary"

[stemmer.roots]
membantu = "bantu"
keracunan = "racun"
"#;

fn small() -> Pipeline {
    let cfg = SentimentConfig::from_toml_str(SMALL).expect("small config");
    Pipeline::from_config(&cfg).expect("small pipeline")
}

fn default_pipeline() -> Pipeline {
    let cfg = SentimentConfig::embedded().expect("embedded config");
    Pipeline::from_config(&cfg).expect("default pipeline")
}

fn records(texts: &[&str]) -> Vec<Record> {
    texts.iter().map(|t| Record::from_text(*t)).collect()
}

#[test]
fn happy_and_spirited_post_is_positive() {
    let p = default_pipeline();
    let a = p.analyze("Bahagia sekali, semangat!!! 🎉 https://t.co/abc");
    assert_eq!(a.cleaned_text, "bahagia sekali semangat");
    assert_eq!(a.breakdown.label, Label::Positive);
    assert!(a.breakdown.score >= 2, "score = {}", a.breakdown.score);
}

#[test]
fn every_positive_word_counts_once() {
    let cfg = SMALL.replace(
        r#"positive = ["enak", "mantap", "bantu", "bahagia"]"#,
        r#"positive = ["enak", "mantap", "bantu", "bahagia", "sekali", "semangat"]"#,
    );
    let p = Pipeline::from_config(&SentimentConfig::from_toml_str(&cfg).unwrap()).unwrap();
    let a = p.analyze("Bahagia sekali, semangat!!! 🎉 https://t.co/abc");
    assert_eq!(a.processed_text, "bahagia sekali semangat");
    assert_eq!(a.breakdown.positive_hits, vec!["bahagia", "sekali", "semangat"]);
    assert!(a.breakdown.negative_hits.is_empty());
    assert_eq!(a.breakdown.score, 3);
    assert_eq!(a.breakdown.label, Label::Positive);
}

#[test]
fn stopword_only_post_is_neutral() {
    let p = default_pipeline();
    let a = p.analyze("ini itu yang");
    assert_eq!(a.cleaned_text, "ini itu yang");
    assert_eq!(a.processed_text, "");
    assert_eq!(a.breakdown.label, Label::Neutral);
    assert_eq!(a.breakdown.score, 0);
}

#[test]
fn negative_phrase_outweighs_positive_word() {
    let a = small().analyze("sangat basi tapi enak");
    assert_eq!(a.breakdown.score, -1);
    assert_eq!(a.breakdown.label, Label::Negative);
    assert_eq!(a.breakdown.negative_phrases, vec!["sangat basi".to_string()]);
    // the phrase's words are consumed, not counted again
    assert!(a.breakdown.negative_hits.is_empty());
}

#[test]
fn balanced_words_resolve_negative() {
    let a = small().analyze("enak tapi basi");
    assert_eq!(a.breakdown.score, 0);
    assert_eq!(a.breakdown.label, Label::Negative);
}

#[test]
fn inflected_words_are_scored_by_root() {
    let p = small();
    assert_eq!(p.analyze("sangat membantu").breakdown.label, Label::Positive);
    assert_eq!(p.analyze("Keracunan massal").breakdown.label, Label::Negative);
}

#[test]
fn slang_is_resolved_once_not_chained() {
    // tuh -> itu (a stopword here); itu -> tersebut must not apply on top
    let a = small().analyze("tuh mantul");
    assert_eq!(a.processed_text, "mantap");
    assert_eq!(a.breakdown.label, Label::Positive);
}

#[test]
fn word_order_does_not_change_the_label() {
    let p = small();
    let a = p.analyze("enak basi mahal mantap").breakdown;
    let b = p.analyze("mahal mantap enak basi").breakdown;
    assert_eq!(a.label, b.label);
    assert_eq!(a.score, b.score);
}

#[test]
fn duplicates_collapse_to_first_occurrence() {
    let p = small();
    let out = p.run(
        records(&["Enak!", "enak", "ENAK   @warung", "basi"]),
        &PipelineOptions::default(),
        &NoopObserver,
    );
    assert_eq!(out.summary.input_records, 4);
    assert_eq!(out.summary.duplicates_dropped, 2);
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].record.text.as_deref(), Some("Enak!"));
    assert_eq!(out.records[1].cleaned_text, "basi");

    // a second pass over the survivors removes nothing
    let again = p.run(
        out.records.iter().map(|r| r.record.clone()).collect(),
        &PipelineOptions::default(),
        &NoopObserver,
    );
    assert_eq!(again.summary.duplicates_dropped, 0);
    assert_eq!(again.records.len(), 2);
}

#[test]
fn empty_texts_are_labeled_neutral_unless_dropped() {
    let p = small();
    let input = vec![
        Record::from_text("123 @user #tag"),
        Record::default(),
        Record::from_text("enak"),
    ];

    let kept = p.run(input.clone(), &PipelineOptions::default(), &NoopObserver);
    // both empties share the "" key, so one of them is a duplicate
    assert_eq!(kept.summary.duplicates_dropped, 1);
    assert_eq!(kept.records.len(), 2);
    assert_eq!(kept.records[0].cleaned_text, "");
    assert_eq!(kept.records[0].label(), Label::Neutral);

    let dropped = p.run(input, &PipelineOptions::preprocessing(), &NoopObserver);
    assert_eq!(dropped.summary.empty_dropped, 2);
    assert_eq!(dropped.summary.duplicates_dropped, 0);
    assert_eq!(dropped.records.len(), 1);
    assert_eq!(dropped.summary.total_dropped(), 2);
}

#[test]
fn summary_counts_labels_and_images() {
    let p = small();
    let mut with_image = Record::from_text("makan gratis enak");
    with_image.image_url = Some("https://pbs.twimg.com/media/x.jpg".into());
    let input = vec![with_image, Record::from_text("basi"), Record::from_text("halo")];

    let out = p.run(input, &PipelineOptions::default(), &NoopObserver);
    let s = &out.summary;
    assert_eq!(s.output_records, 3);
    assert_eq!(s.with_image, 1);
    assert_eq!(s.without_image, 2);
    assert_eq!(s.labels[&Label::Positive], 1);
    assert_eq!(s.labels[&Label::Negative], 1);
    assert_eq!(s.labels[&Label::Neutral], 1);
    assert!((s.mean_word_count - 5.0 / 3.0).abs() < 1e-9);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let p = small();
    let texts: Vec<String> = (0..200)
        .map(|i| match i % 4 {
            0 => format!("enak {i}"),
            1 => "sangat basi".to_string(),
            2 => format!("post nomor {i} mantul"),
            _ => "ini itu".to_string(),
        })
        .collect();
    let input: Vec<Record> = texts.iter().map(|t| Record::from_text(t.as_str())).collect();

    let par = p.run(input.clone(), &PipelineOptions::default(), &NoopObserver);
    let seq = p.run(
        input,
        &PipelineOptions {
            parallel: false,
            ..PipelineOptions::default()
        },
        &NoopObserver,
    );
    let labels = |o: &sosmed_sentiment::PipelineOutput| {
        o.records
            .iter()
            .map(|r| (r.cleaned_text.clone(), r.label()))
            .collect::<Vec<_>>()
    };
    assert_eq!(labels(&par), labels(&seq));
}

struct FixedLanguage(&'static str);

impl LanguageDetector for FixedLanguage {
    fn detect(&self, _text: &str) -> Option<String> {
        Some(self.0.to_string())
    }
}

#[test]
fn content_filter_drops_short_gibberish_and_foreign_text() {
    let input = records(&[
        "enak sekali rasanya",
        "enak",
        "zzz hhh kkk",
        "wkkkkkk enak sekali",
    ]);
    let opts = PipelineOptions {
        validate: true,
        ..PipelineOptions::default()
    };

    let id_filter = ContentFilter::default().with_detector(Arc::new(FixedLanguage("id")));
    let indonesian = small().with_content_filter(id_filter);
    let out = indonesian.run(input.clone(), &opts, &NoopObserver);
    assert_eq!(out.summary.invalid_dropped, 3);
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].cleaned_text, "enak sekali rasanya");

    let en_filter = ContentFilter::default().with_detector(Arc::new(FixedLanguage("en")));
    let english = small().with_content_filter(en_filter);
    let out = english.run(input, &opts, &NoopObserver);
    assert!(out.records.is_empty());
    assert_eq!(out.summary.invalid_dropped, 4);
}

struct Swallowing;

impl Stemmer for Swallowing {
    fn stem(&self, _text: &str) -> String {
        String::new()
    }
}

struct Gluing;

impl Stemmer for Gluing {
    fn stem(&self, text: &str) -> String {
        text.replace(' ', "")
    }
}

#[test]
fn broken_stemmer_is_rejected_at_construction() {
    let cfg = SentimentConfig::from_toml_str(SMALL).unwrap();
    let broken: [Arc<dyn Stemmer>; 2] = [Arc::new(Swallowing), Arc::new(Gluing)];
    for stemmer in broken {
        let err = Pipeline::with_stemmer(&cfg, stemmer).unwrap_err();
        assert!(matches!(err, PipelineError::MissingCapability(_)), "{err}");
    }
}

#[test]
fn overlapping_lexicon_is_a_configuration_error() {
    let bad = SMALL.replace(
        r#"negative = ["basi", "racun", "mahal"]"#,
        r#"negative = ["basi", "enak"]"#,
    );
    let cfg = SentimentConfig::from_toml_str(&bad).unwrap();
    let err = Pipeline::from_config(&cfg).unwrap_err();
    match err {
        PipelineError::Configuration(msg) => assert!(msg.contains("enak"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Default)]
struct Tally {
    analyses: std::sync::Mutex<Vec<Label>>,
    records: std::sync::atomic::AtomicUsize,
}

impl sosmed_sentiment::pipeline::PipelineObserver for Tally {
    fn on_record(&self, _record: &sosmed_sentiment::ProcessedRecord) {
        self.records.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_analysis(&self, analysis: &sosmed_sentiment::Analysis) {
        self.analyses.lock().unwrap().push(analysis.breakdown.label);
    }
}

#[test]
fn single_analysis_is_reported_to_the_observer() {
    let p = small();
    let tally = Tally::default();

    let a = p.analyze_observed("enak tapi basi", &tally);
    assert_eq!(a.breakdown.label, Label::Negative);
    p.analyze_observed("", &tally);
    assert_eq!(*tally.analyses.lock().unwrap(), vec![Label::Negative, Label::Neutral]);

    // batch runs report per record, not per analysis
    p.run(records(&["enak"]), &PipelineOptions::default(), &tally);
    assert_eq!(tally.analyses.lock().unwrap().len(), 2);
    assert_eq!(tally.records.load(std::sync::atomic::Ordering::SeqCst), 1);
}
