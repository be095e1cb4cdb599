//! Per-record rejection reasons raised during ingestion.

use thiserror::Error;

/// Why a single input line was not turned into a score.
///
/// These are recoverable: the ingester logs them and moves on to the next line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("line must contain name, category and score, found {found} field(s)")]
    TooFewFields { found: usize },

    #[error("line must contain exactly name and score, found {found} field(s)")]
    WrongFieldCount { found: usize },

    #[error("line is not valid UTF-8")]
    InvalidEncoding,

    #[error("score must be an integer, got '{0}'")]
    InvalidScore(String),

    #[error("category '{0}' is not supported")]
    UnknownCategory(String),
}
