//! Report rendering and persistence.
//!
//! Supports the plain-text report, pretty-printed JSON and CSV.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::ingest::Mode;
use crate::subject::{CategoryScores, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One human-readable block per subject
    Text,
    /// Pretty-printed JSON document
    Json,
    /// One CSV row per subject and category
    Csv,
}

fn join_scores(scores: &[i64], sep: &str) -> String {
    scores
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Renders one subject as a text block, including the trailing blank line.
pub fn render_block(subject: &Subject) -> String {
    let mut out = String::new();
    out.push_str(subject.name());
    out.push('\n');
    out.push_str("Scores: ");
    for entry in subject.categories() {
        match &entry.category {
            Some(category) => {
                out.push('\n');
                out.push_str(&format!("{}: {}", category, join_scores(&entry.scores, ", ")));
            }
            None => out.push_str(&join_scores(&entry.scores, ", ")),
        }
    }
    out.push('\n');
    out.push_str(&format!("Average score: {:.2}\n", subject.average()));
    out.push('\n');
    out
}

/// Writes the text report for `subjects` in the given order.
pub fn write_text<W: Write>(writer: &mut W, subjects: &[Subject]) -> io::Result<()> {
    for subject in subjects {
        writer.write_all(render_block(subject).as_bytes())?;
    }
    Ok(())
}

/// Per-category figures in the JSON report.
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category: Option<String>,
    pub scores: Vec<i64>,
    pub average: Option<f64>,
}

impl From<&CategoryScores> for CategorySummary {
    fn from(entry: &CategoryScores) -> Self {
        Self {
            category: entry.category.clone(),
            scores: entry.scores.clone(),
            average: entry.average(),
        }
    }
}

/// Per-subject figures in the JSON report.
#[derive(Debug, Serialize)]
pub struct SubjectSummary {
    pub name: String,
    pub average: f64,
    pub categories: Vec<CategorySummary>,
}

/// Complete report document, serialized for `--format json`.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub mode: Mode,
    pub subjects: Vec<SubjectSummary>,
}

impl Report {
    pub fn new(subjects: &[Subject], mode: Mode) -> Self {
        Self {
            generated_at: Utc::now(),
            mode,
            subjects: subjects
                .iter()
                .map(|s| SubjectSummary {
                    name: s.name().to_string(),
                    average: s.average(),
                    categories: s.categories().iter().map(CategorySummary::from).collect(),
                })
                .collect(),
        }
    }
}

pub fn write_json<W: Write>(writer: &mut W, subjects: &[Subject], mode: Mode) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &Report::new(subjects, mode))?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    category: Option<&'a str>,
    scores: String,
    category_average: String,
    average: String,
}

/// Writes one row per subject and category. Scores are joined with `;`.
pub fn write_csv<W: Write>(writer: W, subjects: &[Subject]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for subject in subjects {
        let average = format!("{:.2}", subject.average());
        for entry in subject.categories() {
            writer.serialize(CsvRow {
                name: subject.name(),
                category: entry.category.as_deref(),
                scores: join_scores(&entry.scores, ";"),
                category_average: entry
                    .average()
                    .map(|a| format!("{:.2}", a))
                    .unwrap_or_default(),
                average: average.clone(),
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_to<W: Write>(mut writer: W, subjects: &[Subject], mode: Mode, format: Format) -> Result<()> {
    match format {
        Format::Text => write_text(&mut writer, subjects)?,
        Format::Json => write_json(&mut writer, subjects, mode)?,
        Format::Csv => write_csv(&mut writer, subjects)?,
    }
    writer.flush()?;
    Ok(())
}

/// Writes the report to `path` (created or truncated) or to standard output.
pub fn write_report(
    subjects: &[Subject],
    mode: Mode,
    format: Format,
    path: Option<&Path>,
) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            info!(path = %path.display(), "Writing to file");
            write_to(BufWriter::new(file), subjects, mode, format)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
        }
        None => {
            debug!("Writing report to standard output");
            let stdout = io::stdout();
            write_to(BufWriter::new(stdout.lock()), subjects, mode, format)
                .context("failed to write report to standard output")?;
        }
    }

    info!(subjects = subjects.len(), ?format, "Report written");
    Ok(())
}
