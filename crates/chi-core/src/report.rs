use polars::prelude::*;
use thiserror::Error;

use crate::months::{MonthWindow, ReportMonth};
use crate::schema::{CLASSIFICATION_COLUMNS, HAPPINESS_INDEX_INT, MDN};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("merged table has no score column for {month} (expected '{expected}')")]
    MissingMonth {
        month: ReportMonth,
        expected: String,
    },
    #[error("merged table has no '{0}' column")]
    MissingColumn(String),
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Where a report column comes from in the merged table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub month: ReportMonth,
    pub source: String,
    pub target: String,
}

/// Output header for `window`: `MDN`, one `CHI_<Mon><YY>` per month, then the
/// classification columns.
pub fn report_columns(window: &MonthWindow) -> Vec<String> {
    let mut columns = vec![MDN.to_string()];
    columns.extend(window.months().iter().map(ReportMonth::report_column));
    columns.extend(CLASSIFICATION_COLUMNS.iter().map(|c| c.to_string()));
    columns
}

/// Resolves the score column for each window month. The latest month may be
/// stored under the bare `HAPPINESS_INDEX_INT` name.
pub fn month_columns(
    merged: &DataFrame,
    window: &MonthWindow,
) -> Result<Vec<ColumnMapping>, ReportError> {
    let has = |name: &str| merged.get_column_index(name).is_some();

    window
        .months()
        .into_iter()
        .map(|month| {
            let suffixed = month.source_column();
            let source = if has(&suffixed) {
                suffixed
            } else if month == window.end() && has(HAPPINESS_INDEX_INT) {
                HAPPINESS_INDEX_INT.to_string()
            } else {
                return Err(ReportError::MissingMonth {
                    month,
                    expected: suffixed,
                });
            };
            Ok(ColumnMapping {
                month,
                source,
                target: month.report_column(),
            })
        })
        .collect()
}

/// Selects and renames the merged table into the report layout.
pub fn build_report(merged: &DataFrame, window: &MonthWindow) -> Result<DataFrame, ReportError> {
    for name in std::iter::once(MDN).chain(CLASSIFICATION_COLUMNS) {
        if merged.get_column_index(name).is_none() {
            return Err(ReportError::MissingColumn(name.to_string()));
        }
    }

    let mut selection = vec![col(MDN)];
    for mapping in month_columns(merged, window)? {
        selection.push(col(mapping.source.as_str()).alias(mapping.target.as_str()));
    }
    selection.extend(CLASSIFICATION_COLUMNS.iter().map(|name| col(*name)));

    Ok(merged.clone().lazy().select(selection).collect()?)
}
