//! Line-oriented ingestion of subject records.
//!
//! Records are single-space separated. Categorized mode reads
//! `<name> <category> <score>`, flat mode reads `<name> <score>`.

use crate::config::CategorySet;
use crate::error::RecordError;
use crate::subject::Subject;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// How input lines are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// `<name> <category> <score>`, category checked against the allow-list
    Categorized,
    /// `<name> <score>`, one implicit category
    Flat,
}

/// Where records come from. Decides how an empty line is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// An empty line ends input.
    Interactive,
    /// Empty lines are skipped; end of stream ends input.
    File,
}

/// One accepted input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub category: Option<String>,
    pub score: i64,
}

/// Subjects built from an input stream, plus counters for the run summary.
#[derive(Debug, Default)]
pub struct Ingested {
    pub subjects: HashMap<String, Subject>,
    pub lines_read: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl Ingested {
    fn apply(&mut self, record: Record) {
        self.subjects
            .entry(record.name.clone())
            .or_insert_with(|| Subject::new(record.name))
            .add_score(record.category.as_deref(), record.score);
        self.accepted += 1;
    }

    /// Consumes the ingestion result, yielding subjects in no particular order.
    pub fn into_subjects(self) -> Vec<Subject> {
        self.subjects.into_values().collect()
    }
}

/// Parses a single line into a [`Record`].
///
/// Categorized checks run in order: field count, score, category. Fields past
/// the third are ignored. In flat mode an unparsable score becomes `0`.
pub fn parse_record(
    line: &str,
    mode: Mode,
    categories: &CategorySet,
) -> Result<Record, RecordError> {
    let parts: Vec<&str> = line.split(' ').collect();

    match mode {
        Mode::Categorized => {
            if parts.len() < 3 {
                return Err(RecordError::TooFewFields { found: parts.len() });
            }
            let score = parts[2]
                .parse::<i64>()
                .map_err(|_| RecordError::InvalidScore(parts[2].to_string()))?;
            if !categories.contains(parts[1]) {
                return Err(RecordError::UnknownCategory(parts[1].to_string()));
            }
            Ok(Record {
                name: parts[0].to_string(),
                category: Some(parts[1].to_string()),
                score,
            })
        }
        Mode::Flat => {
            if parts.len() != 2 {
                return Err(RecordError::WrongFieldCount { found: parts.len() });
            }
            Ok(Record {
                name: parts[0].to_string(),
                category: None,
                score: parts[1].parse::<i64>().unwrap_or(0),
            })
        }
    }
}

/// Reads every record from `reader` and accumulates them per subject.
///
/// Rejected lines are logged and skipped; they never create or touch a
/// subject. Only read failures are returned as errors.
pub fn ingest<R: BufRead>(
    mut reader: R,
    source: Source,
    mode: Mode,
    categories: &CategorySet,
) -> io::Result<Ingested> {
    let mut ingested = Ingested::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        if buf.is_empty() {
            match source {
                Source::Interactive => break,
                Source::File => continue,
            }
        }
        ingested.lines_read += 1;

        let parsed = std::str::from_utf8(&buf)
            .map_err(|_| RecordError::InvalidEncoding)
            .and_then(|line| parse_record(line, mode, categories));

        match parsed {
            Ok(record) => {
                debug!(line_no, name = %record.name, score = record.score, "Record accepted");
                ingested.apply(record);
            }
            Err(e @ RecordError::WrongFieldCount { .. }) => {
                debug!(line_no, reason = %e, "Skipping malformed line");
                ingested.rejected += 1;
            }
            Err(e) => {
                warn!(line_no, line = %String::from_utf8_lossy(&buf), "Error: {}", e);
                ingested.rejected += 1;
            }
        }
    }

    info!(
        lines = ingested.lines_read,
        accepted = ingested.accepted,
        rejected = ingested.rejected,
        subjects = ingested.subjects.len(),
        "Ingestion finished"
    );

    Ok(ingested)
}

/// Opens `path` and ingests it in file mode.
pub fn ingest_path(path: &Path, mode: Mode, categories: &CategorySet) -> Result<Ingested> {
    let file = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    info!(path = %path.display(), "Reading data from file");

    let ingested = ingest(BufReader::new(file), Source::File, mode, categories)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    Ok(ingested)
}

/// Prompts on the console and ingests standard input until an empty line.
pub fn ingest_stdin(mode: Mode, categories: &CategorySet) -> Result<Ingested> {
    match mode {
        Mode::Categorized => info!(
            categories = %categories.iter().collect::<Vec<_>>().join(", "),
            "Enter records line by line as '<name> <category> <score>'. An empty line ends input"
        ),
        Mode::Flat => {
            info!("Enter records line by line as '<name> <score>'. An empty line ends input")
        }
    }

    let stdin = io::stdin();
    let ingested = ingest(stdin.lock(), Source::Interactive, mode, categories)
        .context("failed to read standard input")?;
    Ok(ingested)
}
