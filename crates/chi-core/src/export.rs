use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("delimiter {0:?} must be a single ASCII character")]
    InvalidDelimiter(char),
    #[error("failed to serialize table: {0}")]
    Polars(#[from] PolarsError),
}

/// Writes `df` with a header row and no index column; nulls become empty fields.
pub fn write_table_to<W: Write>(
    df: &DataFrame,
    writer: &mut W,
    delimiter: char,
) -> Result<(), ExportError> {
    if !delimiter.is_ascii() || delimiter == '\n' || delimiter == '\r' {
        return Err(ExportError::InvalidDelimiter(delimiter));
    }

    let mut clone = df.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(delimiter as u8)
        .finish(&mut clone)?;
    Ok(())
}

pub fn write_table(df: &DataFrame, path: &Path, delimiter: char) -> Result<(), ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    write_table_to(df, &mut writer, delimiter)?;
    writer.flush().map_err(io_error)
}
