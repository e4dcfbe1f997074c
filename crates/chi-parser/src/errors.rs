use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown text encoding '{label}'")]
    UnknownEncoding { label: String },

    #[error("input is not valid {encoding}")]
    Malformed { encoding: &'static str },

    #[error("delimiter {delimiter:?} must be a single ASCII character")]
    InvalidDelimiter { delimiter: char },

    #[error("no header row found after skipping {skipped} lines")]
    EmptyData { skipped: usize },

    #[error("header row invalid: {message}")]
    InvalidHeader { message: String },

    #[error("missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("delimited text error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to build table: {0}")]
    Polars(#[from] PolarsError),
}
