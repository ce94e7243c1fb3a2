// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::error::{PipelineError, Result};
pub use crate::pipeline::{
    Analysis, Pipeline, PipelineOptions, PipelineOutput, ProcessedRecord, Record, Summary,
};
pub use crate::sentiment::{Label, LabelStyle, SentimentScorer};
