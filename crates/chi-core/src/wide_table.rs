use std::collections::HashMap;
use std::path::Path;

use chi_parser::{load_delimited, LoadOptions, ParserError};
use polars::prelude::*;
use thiserror::Error;

use crate::derive::truncate_score;
use crate::months::MonthWindow;
use crate::schema::{is_missing, HAPPINESS_INDEX_INT, MDN, MONTH};

#[derive(Debug, Error)]
pub enum WideTableError {
    #[error("failed to load wide table: {0}")]
    Parser(#[from] ParserError),
    #[error("wide table column '{column}' row {row}: unparseable score '{value}'")]
    InvalidScore {
        column: String,
        row: usize,
        value: String,
    },
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// A wide table built from the events themselves.
#[derive(Debug, Clone)]
pub struct PivotOutcome {
    pub table: DataFrame,
    /// Events whose month lies outside the window.
    pub out_of_window: usize,
}

/// Score columns present in `df`: the bare `HAPPINESS_INDEX_INT` and every
/// `HAPPINESS_INDEX_INT_<suffix>`.
pub fn score_columns(df: &DataFrame) -> Vec<String> {
    let prefix = format!("{HAPPINESS_INDEX_INT}_");
    df.get_column_names_str()
        .into_iter()
        .filter(|name| *name == HAPPINESS_INDEX_INT || name.starts_with(&prefix))
        .map(str::to_string)
        .collect()
}

pub fn load_wide_table(path: &Path, options: &LoadOptions) -> Result<DataFrame, WideTableError> {
    let options = options.clone().with_required(&[MDN]);
    let table = load_delimited(path, &options)?;
    normalize_wide_table(table.df)
}

/// Trims `MDN` and converts every score column to nullable integers.
///
/// Pivoted exports usually store scores as `7.0`, with blanks where a
/// subscriber had no event that month; blanks become nulls.
pub fn normalize_wide_table(mut df: DataFrame) -> Result<DataFrame, WideTableError> {
    let mdns: Vec<Option<String>> = df
        .column(MDN)?
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(|value| value.map(|v| v.trim().to_string()))
        .collect();
    df.with_column(Series::new(MDN.into(), mdns))?;

    for name in score_columns(&df) {
        let raw = df.column(&name)?;
        if raw.dtype().is_integer() {
            let ints = raw.cast(&DataType::Int64)?;
            df.with_column(ints)?;
            continue;
        }

        let text = raw.cast(&DataType::String)?;
        let text = text.str()?;
        let mut values = Vec::with_capacity(text.len());
        for (idx, value) in text.into_iter().enumerate() {
            let parsed = match value {
                None => None,
                Some(v) if is_missing(v) => None,
                Some(v) => Some(truncate_score(v).ok_or_else(|| WideTableError::InvalidScore {
                    column: name.clone(),
                    row: idx + 1,
                    value: v.to_string(),
                })?),
            };
            values.push(parsed);
        }
        df.with_column(Series::new(name.as_str().into(), values))?;
    }

    Ok(df)
}

/// Builds the wide table from derived events: one row per `MDN` in first-seen
/// order and one `HAPPINESS_INDEX_INT_<Mon><YY>` column per window month,
/// holding the first score seen for that subscriber and month.
pub fn pivot_events(events: &DataFrame, window: &MonthWindow) -> Result<PivotOutcome, WideTableError> {
    let subscribers = events.column(MDN)?.str()?;
    let month_labels = events.column(MONTH)?.str()?;
    let scores = events.column(HAPPINESS_INDEX_INT)?.i64()?;

    let months = window.months();
    let positions: HashMap<String, usize> = months
        .iter()
        .enumerate()
        .map(|(pos, month)| (month.label(), pos))
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut rows: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<Vec<Option<i64>>> = vec![Vec::new(); months.len()];
    let mut out_of_window = 0;

    for idx in 0..events.height() {
        let (Some(mdn), Some(label)) = (subscribers.get(idx), month_labels.get(idx)) else {
            continue;
        };
        let Some(&pos) = positions.get(label) else {
            out_of_window += 1;
            continue;
        };

        let row = *rows.entry(mdn.to_string()).or_insert_with(|| {
            order.push(mdn.to_string());
            for column in cells.iter_mut() {
                column.push(None);
            }
            order.len() - 1
        });

        if cells[pos][row].is_none() {
            cells[pos][row] = scores.get(idx);
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(months.len() + 1);
    columns.push(Series::new(MDN.into(), order).into());
    for (month, values) in months.iter().zip(cells) {
        columns.push(Series::new(month.source_column().into(), values).into());
    }

    Ok(PivotOutcome {
        table: DataFrame::new(columns)?,
        out_of_window,
    })
}
