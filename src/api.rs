use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::pipeline::{Analysis, MetricsObserver, Pipeline, PipelineOptions, Record};

/// Upper bound on items accepted by `/batch`.
pub const MAX_BATCH: usize = 1000;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(analyze_batch))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Json<Analysis> {
    Json(
        state
            .pipeline
            .analyze_observed(&body.text, &MetricsObserver::new()),
    )
}

/// One result per item, in request order (no dedup, nothing dropped).
async fn analyze_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<AnalyzeReq>>,
) -> Result<Json<Vec<Analysis>>, (StatusCode, String)> {
    if items.len() > MAX_BATCH {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("batch of {} exceeds limit {MAX_BATCH}", items.len()),
        ));
    }
    let records = items
        .into_iter()
        .map(|it| Record::from_text(it.text))
        .collect::<Vec<_>>();
    let opts = PipelineOptions {
        dedup: false,
        parallel: false,
        ..PipelineOptions::default()
    };
    let out = state.pipeline.run(records, &opts, &MetricsObserver::new());
    Ok(Json(out.records.into_iter().map(Analysis::from).collect()))
}
