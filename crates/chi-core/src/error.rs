use chi_parser::ParserError;
use polars::prelude::PolarsError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::derive::DeriveError;
use crate::export::ExportError;
use crate::merge::MergeError;
use crate::report::ReportError;
use crate::wide_table::WideTableError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load events: {0}")]
    Parser(#[from] ParserError),

    #[error("failed to derive event columns: {0}")]
    Derive(#[from] DeriveError),

    #[error("wide table error: {0}")]
    WideTable(#[from] WideTableError),

    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("report projection failed: {0}")]
    Report(#[from] ReportError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
