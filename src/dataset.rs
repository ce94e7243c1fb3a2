// src/dataset.rs
//! Delimited dataset I/O.
//!
//! Input is a headed CSV with at least one free-text column. The text column is the
//! one named explicitly, else the first header containing `text`, `content`,
//! `caption` or `cleaned` (case-insensitive), else the first column. Engagement and
//! image columns are picked up by name when present.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::pipeline::{ProcessedRecord, Record};
use crate::sentiment::LabelStyle;

pub const TEXT_COLUMN_HINTS: [&str; 4] = ["text", "content", "caption", "cleaned"];

const COL_IMAGE_URL: &str = "image_url";
const COL_FAVORITES: &str = "favorite_count";
const COL_RETWEETS: &str = "retweet_count";
const COL_REPLIES: &str = "reply_count";
const COL_LABEL: &str = "label";

#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub text_column: String,
    pub records: Vec<Record>,
}

impl Dataset {
    /// The input carried a manually assigned `label` column.
    pub fn has_gold_label(&self) -> bool {
        find_column(&self.headers, COL_LABEL).is_some()
    }
}

/// Index of the free-text column (best-effort substring match, fallback 0).
pub fn detect_text_column(headers: &[String]) -> usize {
    headers
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            TEXT_COLUMN_HINTS.iter().any(|hint| h.contains(hint))
        })
        .unwrap_or(0)
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Read a dataset file. A missing or unreadable file is an error and nothing
/// downstream runs.
pub fn read_dataset(path: &Path, text_column: Option<&str>) -> Result<Dataset> {
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_dataset_from(file, path, text_column)
}

/// Same as [`read_dataset`] over any reader; `path` is only used in errors.
pub fn read_dataset_from<R: Read>(
    reader: R,
    path: &Path,
    text_column: Option<&str>,
) -> Result<Dataset> {
    let csv_err = |source: csv::Error| PipelineError::Dataset {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.is_empty() {
        return Err(PipelineError::Configuration(format!(
            "{} has no header row",
            path.display()
        )));
    }

    let text_idx = match text_column {
        Some(name) => headers.iter().position(|h| h == name).ok_or_else(|| {
            PipelineError::Configuration(format!(
                "text column `{name}` not found in {}",
                path.display()
            ))
        })?,
        None => detect_text_column(&headers),
    };
    let image_idx = find_column(&headers, COL_IMAGE_URL);
    let fav_idx = find_column(&headers, COL_FAVORITES);
    let rt_idx = find_column(&headers, COL_RETWEETS);
    let reply_idx = find_column(&headers, COL_REPLIES);
    let label_idx = find_column(&headers, COL_LABEL);

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(csv_err)?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        records.push(Record {
            text: cell(Some(text_idx)),
            image_url: cell(image_idx),
            favorite_count: cell(fav_idx),
            retweet_count: cell(rt_idx),
            reply_count: cell(reply_idx),
            label: cell(label_idx),
        });
    }

    Ok(Dataset {
        path: path.to_path_buf(),
        text_column: headers[text_idx].clone(),
        headers,
        records,
    })
}

/// Which columns go into the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// Original text, cleaned and processed text, predicted label
    /// (+ the input's `label` column when it had one).
    Labeled { style: LabelStyle, gold_label: bool },
    /// Original text, cleaned and processed text, derived statistics.
    Preprocessed,
}

fn output_headers(text_column: &str, layout: OutputLayout) -> Vec<String> {
    let mut h = vec![
        text_column.to_string(),
        "cleaned_text".to_string(),
        "processed_text".to_string(),
    ];
    match layout {
        OutputLayout::Labeled { gold_label, .. } => {
            h.push("label_pred".into());
            if gold_label {
                h.push(COL_LABEL.into());
            }
        }
        OutputLayout::Preprocessed => {
            h.extend(
                [
                    "text_length",
                    "word_count",
                    "has_image",
                    COL_FAVORITES,
                    COL_RETWEETS,
                    COL_REPLIES,
                ]
                .map(String::from),
            );
        }
    }
    h
}

fn output_row(r: &ProcessedRecord, layout: OutputLayout) -> Vec<String> {
    let mut row = vec![
        r.record.text.clone().unwrap_or_default(),
        r.cleaned_text.clone(),
        r.processed_text.clone(),
    ];
    match layout {
        OutputLayout::Labeled { style, gold_label } => {
            row.push(r.label().styled(style).to_string());
            if gold_label {
                row.push(r.record.label.clone().unwrap_or_default());
            }
        }
        OutputLayout::Preprocessed => {
            let s = &r.stats;
            row.push(s.text_length.to_string());
            row.push(s.word_count.to_string());
            row.push(u8::from(s.has_image).to_string());
            row.push(s.favorite_count.to_string());
            row.push(s.retweet_count.to_string());
            row.push(s.reply_count.to_string());
        }
    }
    row
}

/// Write processed records to `path`, replacing any existing file.
pub fn write_output(
    path: &Path,
    text_column: &str,
    records: &[ProcessedRecord],
    layout: OutputLayout,
) -> Result<()> {
    let file = File::create(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_output_to(file, path, text_column, records, layout)
}

/// Same as [`write_output`] over any writer; `path` is only used in errors.
pub fn write_output_to<W: Write>(
    writer: W,
    path: &Path,
    text_column: &str,
    records: &[ProcessedRecord],
    layout: OutputLayout,
) -> Result<()> {
    let csv_err = |source: csv::Error| PipelineError::Dataset {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(output_headers(text_column, layout))
        .map_err(csv_err)?;
    for r in records {
        wtr.write_record(output_row(r, layout)).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
