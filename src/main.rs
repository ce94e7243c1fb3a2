//! `sentimen`: batch labeling and preprocessing of Indonesian social-media text,
//! plus a small HTTP service over the same pipeline.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sosmed_sentiment::api::{create_router, AppState};
use sosmed_sentiment::config::{load_config_default, load_config_from, SentimentConfig};
use sosmed_sentiment::dataset::{read_dataset, write_output, Dataset, OutputLayout};
use sosmed_sentiment::metrics::Metrics;
use sosmed_sentiment::pipeline::{
    ObserverSet, Pipeline, PipelineOptions, ProcessedRecord, Summary, TracingObserver,
};
use sosmed_sentiment::sentiment::LabelStyle;

const PREVIEW_ROWS: usize = 5;
const PREVIEW_CHARS: usize = 80;

/// Rule-based sentiment labeling for Indonesian social-media text.
#[derive(Parser, Debug)]
#[command(name = "sentimen", version, about)]
struct Cli {
    /// Configuration file (TOML or JSON). Falls back to SENTIMEN_CONFIG_PATH,
    /// then config/sentiment.toml, then the built-in default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean, deduplicate and label a dataset.
    Label {
        #[command(flatten)]
        run: RunArgs,

        /// Spelling of labels in the output file
        #[arg(long, value_enum, default_value_t = StyleArg::English)]
        label_style: StyleArg,

        /// Drop records whose cleaned text is empty
        #[arg(long)]
        drop_empty: bool,
    },
    /// Clean and deduplicate a dataset, writing text statistics instead of labels.
    Preprocess {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Analyze texts given on the command line and print JSON breakdowns.
    Analyze {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Load the configuration, build the pipeline and report lexicon problems.
    CheckConfig,
    /// Serve the pipeline over HTTP.
    Serve {
        #[arg(long, env = "SENTIMEN_ADDR", default_value = "0.0.0.0:8080")]
        addr: SocketAddr,

        /// Expose Prometheus metrics on /metrics
        #[arg(long)]
        metrics: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input CSV
    #[arg(short, long, env = "SENTIMEN_INPUT")]
    input: PathBuf,

    /// Output CSV (overwritten)
    #[arg(short, long, env = "SENTIMEN_OUTPUT")]
    output: PathBuf,

    /// Name of the text column (default: detected from headers)
    #[arg(long)]
    text_column: Option<String>,

    /// Also write the run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Keep exact duplicates of the cleaned text
    #[arg(long)]
    no_dedup: bool,

    /// Drop records rejected by the content filter
    #[arg(long)]
    validate: bool,

    /// Process records on the calling thread only
    #[arg(long)]
    sequential: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    English,
    Indonesian,
}

impl From<StyleArg> for LabelStyle {
    fn from(s: StyleArg) -> Self {
        match s {
            StyleArg::English => LabelStyle::English,
            StyleArg::Indonesian => LabelStyle::Indonesian,
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let fallback = match verbose {
        0 => "sosmed_sentiment=info,sentimen=info,warn",
        1 => "sosmed_sentiment=debug,sentimen=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn load_config(path: Option<&Path>) -> Result<SentimentConfig> {
    match path {
        Some(p) => load_config_from(p),
        None => load_config_default(),
    }
}

fn build_pipeline(cfg: &SentimentConfig) -> Result<Pipeline> {
    let pipeline = Pipeline::from_config(cfg).context("building pipeline")?;
    for w in pipeline.lint() {
        warn!("{w}");
    }
    Ok(pipeline)
}

fn clip(s: &str, max: usize) -> String {
    let mut out: String = s.chars().take(max).collect();
    if s.chars().nth(max).is_some() {
        out.push('…');
    }
    out
}

fn log_preview(records: &[ProcessedRecord]) {
    for (i, r) in records.iter().take(PREVIEW_ROWS).enumerate() {
        info!(
            row = i,
            original = %clip(r.record.text.as_deref().unwrap_or_default(), PREVIEW_CHARS),
            cleaned = %clip(&r.cleaned_text, PREVIEW_CHARS),
            label = r.label().as_str(),
            "sample"
        );
    }
}

fn write_summary(path: &Path, summary: &Summary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("serializing summary")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "summary written");
    Ok(())
}

fn run_dataset(
    pipeline: &Pipeline,
    args: &RunArgs,
    opts: PipelineOptions,
    layout: impl FnOnce(&Dataset) -> OutputLayout,
) -> Result<()> {
    let dataset = read_dataset(&args.input, args.text_column.as_deref())
        .with_context(|| format!("reading {}", args.input.display()))?;
    info!(
        path = %dataset.path.display(),
        rows = dataset.records.len(),
        text_column = %dataset.text_column,
        "dataset loaded"
    );
    let layout = layout(&dataset);
    let text_column = dataset.text_column.clone();

    let observer = ObserverSet::new().with(TracingObserver::new());
    let out = pipeline.run(dataset.records, &opts, &observer);
    log_preview(&out.records);

    write_output(&args.output, &text_column, &out.records, layout)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        path = %args.output.display(),
        rows = out.records.len(),
        "output written"
    );

    if let Some(path) = &args.summary {
        write_summary(path, &out.summary)?;
    }
    Ok(())
}

async fn serve(pipeline: Pipeline, addr: SocketAddr, with_metrics: bool) -> Result<()> {
    let pipeline = Arc::new(pipeline);
    let mut app = create_router(AppState::new(pipeline.clone()));
    if with_metrics {
        let m = Metrics::init(pipeline.scorer().lexicon().entry_count())?;
        app = app.merge(m.router());
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, metrics = with_metrics, "listening");
    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let cfg = load_config(cli.config.as_deref())?;
    let pipeline = build_pipeline(&cfg)?;

    match cli.command {
        Command::Label {
            run,
            label_style,
            drop_empty,
        } => {
            let opts = PipelineOptions {
                drop_empty,
                dedup: !run.no_dedup,
                validate: run.validate,
                parallel: !run.sequential,
            };
            run_dataset(&pipeline, &run, opts, |ds| OutputLayout::Labeled {
                style: label_style.into(),
                gold_label: ds.has_gold_label(),
            })
        }
        Command::Preprocess { run } => {
            let opts = PipelineOptions {
                dedup: !run.no_dedup,
                validate: run.validate,
                parallel: !run.sequential,
                ..PipelineOptions::preprocessing()
            };
            run_dataset(&pipeline, &run, opts, |_| OutputLayout::Preprocessed)
        }
        Command::Analyze { text } => {
            for t in &text {
                let a = pipeline.analyze(t);
                println!("{}", serde_json::to_string(&a)?);
            }
            Ok(())
        }
        Command::CheckConfig => {
            let lex = pipeline.scorer().lexicon();
            println!(
                "ok: {} positive / {} negative words, {} / {} phrases, {} lint warnings",
                lex.positive_words().len(),
                lex.negative_words().len(),
                lex.positive_phrases().len(),
                lex.negative_phrases().len(),
                pipeline.lint().len()
            );
            Ok(())
        }
        Command::Serve { addr, metrics } => serve(pipeline, addr, metrics).await,
    }
}
