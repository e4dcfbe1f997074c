use std::collections::HashSet;

use polars::prelude::*;
use thiserror::Error;

use crate::schema::{CLASSIFICATION_COLUMNS, MDN};

const WIDE_ROW: &str = "__wide_row";

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("{table} table has no 'MDN' column")]
    MissingKey { table: &'static str },
    #[error("wide table already carries classification column '{0}'")]
    ConflictingColumn(String),
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: DataFrame,
    /// Wide rows whose `MDN` appears in the subscriber summary.
    pub matched: usize,
    pub unmatched: usize,
}

/// Left join of the wide table against the subscriber summary on `MDN`.
///
/// Every wide row is kept, in its original order. Rows without a summary
/// entry get null classification columns.
pub fn merge_classification(
    wide: &DataFrame,
    summary: &DataFrame,
) -> Result<MergeOutcome, MergeError> {
    if wide.get_column_index(MDN).is_none() {
        return Err(MergeError::MissingKey { table: "wide" });
    }
    if summary.get_column_index(MDN).is_none() {
        return Err(MergeError::MissingKey { table: "summary" });
    }
    if let Some(conflict) = CLASSIFICATION_COLUMNS
        .iter()
        .find(|name| wide.get_column_index(name).is_some())
    {
        return Err(MergeError::ConflictingColumn(conflict.to_string()));
    }

    let wide_keys = wide.column(MDN)?.cast(&DataType::String)?;
    let summary_keys = summary.column(MDN)?.cast(&DataType::String)?;
    let known: HashSet<&str> = summary_keys.str()?.into_iter().flatten().collect();
    let matched = wide_keys
        .str()?
        .into_iter()
        .filter(|key| key.is_some_and(|k| known.contains(k)))
        .count();

    let merged = wide
        .clone()
        .lazy()
        .with_column(col(MDN).cast(DataType::String))
        .with_row_index(WIDE_ROW, None)
        .join(
            summary
                .clone()
                .lazy()
                .with_column(col(MDN).cast(DataType::String)),
            [col(MDN)],
            [col(MDN)],
            JoinArgs::new(JoinType::Left),
        )
        .sort_by_exprs([col(WIDE_ROW)], SortMultipleOptions::default())
        .collect()?
        .drop(WIDE_ROW)?;

    Ok(MergeOutcome {
        matched,
        unmatched: wide.height() - matched,
        merged,
    })
}
