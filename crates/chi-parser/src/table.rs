use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::*;

use crate::encoding::decode_text;
use crate::errors::ParserError;
use crate::schema::{is_missing, missing_columns};

/// How a delimited text file is laid out on disk.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: char,
    /// WHATWG encoding label, e.g. `utf-16` or `utf-8`.
    pub encoding: String,
    /// Lines dropped before the header row.
    pub skip_rows: usize,
    pub required_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            encoding: "utf-16".to_string(),
            skip_rows: 0,
            required_columns: Vec::new(),
        }
    }
}

impl LoadOptions {
    pub fn with_required<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.required_columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }
}

/// A loaded table: every column is a nullable string column in file order.
#[derive(Debug, Clone)]
pub struct DelimitedTable {
    pub df: DataFrame,
    pub encoding: &'static str,
    pub delimiter: char,
}

pub fn load_delimited(path: &Path, options: &LoadOptions) -> Result<DelimitedTable, ParserError> {
    let bytes = fs::read(path).map_err(|source| ParserError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_delimited_bytes(&bytes, options)
}

pub fn load_delimited_bytes(
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<DelimitedTable, ParserError> {
    let delimiter = delimiter_byte(options.delimiter)?;
    let decoded = decode_text(bytes, &options.encoding)?;
    let body = skip_lines(&decoded.text, options.skip_rows);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.iter().all(|name| name.is_empty()) {
        return Err(ParserError::EmptyData {
            skipped: options.skip_rows,
        });
    }
    check_headers(&headers)?;

    let missing = missing_columns(&headers, &options.required_columns);
    if !missing.is_empty() {
        return Err(ParserError::MissingColumns { missing });
    }

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, field) in values.iter_mut().zip(record.iter()) {
            if is_missing(field) {
                column.push(None);
            } else {
                column.push(Some(field.to_string()));
            }
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(values.iter())
        .map(|(name, data)| {
            let utf8: Vec<Option<&str>> = data.iter().map(|v| v.as_deref()).collect();
            Series::new(name.as_str().into(), utf8).into()
        })
        .collect();

    Ok(DelimitedTable {
        df: DataFrame::new(columns)?,
        encoding: decoded.encoding,
        delimiter: options.delimiter,
    })
}

fn delimiter_byte(delimiter: char) -> Result<u8, ParserError> {
    if delimiter.is_ascii() && delimiter != '\n' && delimiter != '\r' {
        Ok(delimiter as u8)
    } else {
        Err(ParserError::InvalidDelimiter { delimiter })
    }
}

fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(idx) => rest = &rest[idx + 1..],
            None => return "",
        }
    }
    rest
}

fn check_headers(headers: &[String]) -> Result<(), ParserError> {
    for (idx, name) in headers.iter().enumerate() {
        if name.is_empty() {
            return Err(ParserError::InvalidHeader {
                message: format!("column {} has an empty name", idx + 1),
            });
        }
        if headers[..idx].contains(name) {
            return Err(ParserError::InvalidHeader {
                message: format!("duplicate column '{name}'"),
            });
        }
    }
    Ok(())
}
