//! Error types for the analysis pipeline.
//!
//! Only [`AnalysisError`] ever reaches the caller. [`RowError`] is local to a
//! single row and is swallowed by the loader, which counts it and moves on.

use thiserror::Error;

/// A single row could not be turned into a normalized record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("column {0} is empty")]
    MissingField(usize),

    #[error("column {column} is not numeric: {value:?}")]
    NotNumeric { column: usize, value: String },

    #[error("no DD.MM.YYYY date in timestamp {0:?}")]
    BadTimestamp(String),
}

/// Failure reported by a row source adapter.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Fatal failure of one analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{0}")]
    Format(String),

    #[error("cannot read row source: {0}")]
    Decode(#[from] DecodeError),
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("cannot read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse profile: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid profile: {0}")]
    Invalid(String),

    #[error("unknown vendor profile {0:?}")]
    Unknown(String),
}

/// Which filter rule discarded a classified candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ShortDuration,
    SentinelVoltage,
    InsideThreshold,
}
